//! List queries.
//!
//! Combines filtering, search and ordering into one pass over the records
//! loaded from the store. Pagination happens afterwards, on the result.

use chrono::NaiveDate;

use crate::filter::{
    AssignedFilter, BacklogFilter, CompositeFilter, EndAfterFilter, EndBeforeFilter, Filter,
    InSprintFilter, StatusFilter,
};
use crate::search::{Searchable, TextSearcher};
use crate::sort::{OrderingSpec, SortKey, SortOrder, SprintSortField, TaskSortField, UserSortField};
use crate::{Sprint, SprintId, Task, TaskStatus, User, UserId};

/// Filter, search and order a record set.
fn run<T, K>(
    items: Vec<T>,
    filters: &CompositeFilter<T>,
    search: Option<&TextSearcher>,
    ordering: &OrderingSpec<K>,
) -> Vec<T>
where
    T: Searchable,
    K: SortKey<Item = T>,
{
    let mut matched: Vec<T> = items
        .into_iter()
        .filter(|item| filters.matches(item))
        .filter(|item| search.map_or(true, |searcher| searcher.matches(item)))
        .collect();
    ordering.sort(&mut matched);
    matched
}

/// Builder for task list queries.
pub struct TaskQuery {
    filters: CompositeFilter<Task>,
    search: Option<TextSearcher>,
    ordering: OrderingSpec<TaskSortField>,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self {
            filters: CompositeFilter::new(),
            search: None,
            ordering: Self::default_ordering(),
        }
    }

    pub fn default_ordering() -> OrderingSpec<TaskSortField> {
        OrderingSpec::by(TaskSortField::Id, SortOrder::Ascending)
    }

    pub fn in_sprint(mut self, sprint_id: SprintId) -> Self {
        self.filters.push(InSprintFilter::in_sprint(sprint_id));
        self
    }

    /// `true` keeps only backlog tasks, `false` only scheduled ones.
    pub fn backlog(mut self, backlog: bool) -> Self {
        self.filters.push(BacklogFilter::new(backlog));
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.filters.push(StatusFilter::new(status));
        self
    }

    pub fn assigned_to(mut self, user_id: UserId) -> Self {
        self.filters.push(AssignedFilter::new(user_id));
        self
    }

    pub fn search(mut self, query: &str) -> Self {
        let searcher = TextSearcher::new(query);
        if !searcher.terms().is_empty() {
            self.search = Some(searcher);
        }
        self
    }

    pub fn order_by(mut self, expr: Option<&str>) -> Self {
        self.ordering = OrderingSpec::parse(expr, Self::default_ordering());
        self
    }

    pub fn execute(&self, tasks: Vec<Task>) -> Vec<Task> {
        run(tasks, &self.filters, self.search.as_ref(), &self.ordering)
    }
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for sprint list queries. Sprints come back by end date unless
/// told otherwise.
pub struct SprintQuery {
    filters: CompositeFilter<Sprint>,
    search: Option<TextSearcher>,
    ordering: OrderingSpec<SprintSortField>,
}

impl SprintQuery {
    pub fn new() -> Self {
        Self {
            filters: CompositeFilter::new(),
            search: None,
            ordering: Self::default_ordering(),
        }
    }

    pub fn default_ordering() -> OrderingSpec<SprintSortField> {
        OrderingSpec::by(SprintSortField::End, SortOrder::Ascending)
    }

    pub fn ends_after(mut self, min: NaiveDate) -> Self {
        self.filters.push(EndAfterFilter::new(min));
        self
    }

    pub fn ends_before(mut self, max: NaiveDate) -> Self {
        self.filters.push(EndBeforeFilter::new(max));
        self
    }

    pub fn search(mut self, query: &str) -> Self {
        let searcher = TextSearcher::new(query);
        if !searcher.terms().is_empty() {
            self.search = Some(searcher);
        }
        self
    }

    pub fn order_by(mut self, expr: Option<&str>) -> Self {
        self.ordering = OrderingSpec::parse(expr, Self::default_ordering());
        self
    }

    pub fn execute(&self, sprints: Vec<Sprint>) -> Vec<Sprint> {
        run(sprints, &self.filters, self.search.as_ref(), &self.ordering)
    }
}

impl Default for SprintQuery {
    fn default() -> Self {
        Self::new()
    }
}

pub struct UserQuery {
    search: Option<TextSearcher>,
}

impl UserQuery {
    pub fn new() -> Self {
        Self { search: None }
    }

    pub fn search(mut self, query: &str) -> Self {
        let searcher = TextSearcher::new(query);
        if !searcher.terms().is_empty() {
            self.search = Some(searcher);
        }
        self
    }

    pub fn execute(&self, users: Vec<User>) -> Vec<User> {
        run(
            users,
            &CompositeFilter::new(),
            self.search.as_ref(),
            &OrderingSpec::by(UserSortField::Username, SortOrder::Ascending),
        )
    }
}

impl Default for UserQuery {
    fn default() -> Self {
        Self::new()
    }
}
