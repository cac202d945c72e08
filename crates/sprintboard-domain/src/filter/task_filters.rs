//! Task filtering implementations.
//!
//! Filters for sprint membership, backlog, status and assignee.

use std::collections::HashSet;

use super::Filter;
use crate::{SprintId, Task, TaskStatus, UserId};

/// Filter tasks by sprint membership.
///
/// Matches tasks that are assigned to any of the specified sprints.
pub struct InSprintFilter {
    sprint_ids: HashSet<SprintId>,
}

impl InSprintFilter {
    /// Create a filter for tasks in specific sprints.
    pub fn in_sprints(ids: impl IntoIterator<Item = SprintId>) -> Self {
        Self {
            sprint_ids: ids.into_iter().collect(),
        }
    }

    /// Create a filter for tasks in a single sprint.
    pub fn in_sprint(id: SprintId) -> Self {
        Self::in_sprints(std::iter::once(id))
    }
}

impl Filter<Task> for InSprintFilter {
    fn matches(&self, task: &Task) -> bool {
        task.sprint.is_some_and(|id| self.sprint_ids.contains(&id))
    }
}

/// Backlog (`true`) or scheduled (`false`) tasks.
pub struct BacklogFilter {
    backlog: bool,
}

impl BacklogFilter {
    pub fn new(backlog: bool) -> Self {
        Self { backlog }
    }
}

impl Filter<Task> for BacklogFilter {
    fn matches(&self, task: &Task) -> bool {
        task.is_backlog() == self.backlog
    }
}

pub struct StatusFilter {
    status: TaskStatus,
}

impl StatusFilter {
    pub fn new(status: TaskStatus) -> Self {
        Self { status }
    }
}

impl Filter<Task> for StatusFilter {
    fn matches(&self, task: &Task) -> bool {
        task.status == self.status
    }
}

pub struct AssignedFilter {
    user_id: UserId,
}

impl AssignedFilter {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

impl Filter<Task> for AssignedFilter {
    fn matches(&self, task: &Task) -> bool {
        task.assigned == Some(self.user_id)
    }
}
