//! Record filtering.
//!
//! Provides the Filter trait and per-resource filter implementations.

pub mod sprint_filters;
pub mod task_filters;

pub use sprint_filters::{EndAfterFilter, EndBeforeFilter};
pub use task_filters::{AssignedFilter, BacklogFilter, InSprintFilter, StatusFilter};

/// Trait for filtering records by various criteria.
pub trait Filter<T> {
    /// Returns true if the record matches the filter criteria.
    fn matches(&self, item: &T) -> bool;
}

/// Combine multiple filters with AND logic.
///
/// A record matches only if it passes all filters.
pub struct CompositeFilter<T> {
    filters: Vec<Box<dyn Filter<T> + Send + Sync>>,
}

impl<T> CompositeFilter<T> {
    /// Create an empty composite filter (matches everything).
    pub fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Add a filter to the composite (builder pattern).
    pub fn with_filter(mut self, filter: impl Filter<T> + Send + Sync + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn push(&mut self, filter: impl Filter<T> + Send + Sync + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Check if the composite has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<T> Default for CompositeFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Filter<T> for CompositeFilter<T> {
    fn matches(&self, item: &T) -> bool {
        self.filters.iter().all(|f| f.matches(item))
    }
}
