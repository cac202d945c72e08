use chrono::NaiveDate;

use super::Filter;
use crate::Sprint;

/// Sprints ending on or after a date.
pub struct EndAfterFilter {
    min: NaiveDate,
}

impl EndAfterFilter {
    pub fn new(min: NaiveDate) -> Self {
        Self { min }
    }
}

impl Filter<Sprint> for EndAfterFilter {
    fn matches(&self, sprint: &Sprint) -> bool {
        sprint.end >= self.min
    }
}

/// Sprints ending on or before a date.
pub struct EndBeforeFilter {
    max: NaiveDate,
}

impl EndBeforeFilter {
    pub fn new(max: NaiveDate) -> Self {
        Self { max }
    }
}

impl Filter<Sprint> for EndBeforeFilter {
    fn matches(&self, sprint: &Sprint) -> bool {
        sprint.end <= self.max
    }
}
