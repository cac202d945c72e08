use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field_update::FieldUpdate;
use crate::sprint::SprintId;
use crate::user::UserId;

pub type TaskId = i64;

pub const NAME_MAX_LENGTH: usize = 100;

/// Workflow status. Travels on the wire as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Testing,
    Done,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{0}\" is not a valid choice.")]
pub struct ParseStatusError(pub String);

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Testing,
        TaskStatus::Done,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Self::NotStarted => 1,
            Self::InProgress => 2,
            Self::Testing => 3,
            Self::Done => 4,
        }
    }

    /// Human readable label shown next to the code.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Testing => "Testing",
            Self::Done => "Done",
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = ParseStatusError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| ParseStatusError(code.to_string()))
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s
            .trim()
            .parse()
            .map_err(|_| ParseStatusError(s.to_string()))?;
        Self::try_from(code)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sprint: Option<SprintId>,
    #[serde(default)]
    pub order: i16,
    pub assigned: Option<UserId>,
    pub started: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub completed: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            sprint: draft.sprint,
            order: draft.order,
            assigned: draft.assigned,
            started: draft.started,
            due: draft.due,
            completed: draft.completed,
            status: draft.status,
        }
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            sprint: self.sprint,
            order: self.order,
            assigned: self.assigned,
            started: self.started,
            due: self.due,
            completed: self.completed,
            status: self.status,
        }
    }

    pub fn is_backlog(&self) -> bool {
        self.sprint.is_none()
    }
}

/// Task values that have not been given an identity yet, or the proposed
/// state of an existing task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub sprint: Option<SprintId>,
    pub order: i16,
    pub assigned: Option<UserId>,
    pub started: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub completed: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn in_sprint(mut self, sprint: SprintId) -> Self {
        self.sprint = Some(sprint);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn apply(&mut self, updates: TaskUpdate) {
        if let Some(name) = updates.name {
            self.name = name;
        }
        if let Some(description) = updates.description {
            self.description = description;
        }
        if let Some(order) = updates.order {
            self.order = order;
        }
        if let Some(status) = updates.status {
            self.status = status;
        }
        updates.sprint.apply_to(&mut self.sprint);
        updates.assigned.apply_to(&mut self.assigned);
        updates.started.apply_to(&mut self.started);
        updates.due.apply_to(&mut self.due);
        updates.completed.apply_to(&mut self.completed);
    }
}

/// Partial update struct for Task
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub order: Option<i16>,
    pub status: Option<TaskStatus>,
    pub sprint: FieldUpdate<SprintId>,
    pub assigned: FieldUpdate<UserId>,
    pub started: FieldUpdate<NaiveDate>,
    pub due: FieldUpdate<NaiveDate>,
    pub completed: FieldUpdate<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip_through_json() {
        let json = serde_json::to_string(&TaskStatus::Testing).unwrap();
        assert_eq!(json, "3");

        let status: TaskStatus = serde_json::from_str("4").unwrap();
        assert_eq!(status, TaskStatus::Done);
    }

    #[test]
    fn test_unknown_status_code_rejected() {
        assert_eq!(
            TaskStatus::try_from(9),
            Err(ParseStatusError("9".to_string()))
        );
        assert!(serde_json::from_str::<TaskStatus>("0").is_err());
        assert!("x".parse::<TaskStatus>().is_err());
        assert_eq!("2".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
    }

    #[test]
    fn test_labels() {
        let labels: Vec<_> = TaskStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Not Started", "In Progress", "Testing", "Done"]);
        assert_eq!(TaskStatus::default(), TaskStatus::NotStarted);
    }

    #[test]
    fn test_apply_clears_and_sets() {
        let started = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut draft = TaskDraft::new("Write docs").in_sprint(7);
        draft.started = Some(started);

        draft.apply(TaskUpdate {
            sprint: FieldUpdate::Clear,
            assigned: FieldUpdate::Set(3),
            order: Some(-2),
            ..Default::default()
        });

        assert_eq!(draft.sprint, None);
        assert_eq!(draft.assigned, Some(3));
        assert_eq!(draft.order, -2);
        assert_eq!(draft.started, Some(started));
        assert_eq!(draft.name, "Write docs");
    }

    #[test]
    fn test_draft_round_trip_keeps_identity() {
        let task = Task::from_draft(11, TaskDraft::new("A").with_status(TaskStatus::InProgress));
        assert_eq!(task.id, 11);
        assert_eq!(Task::from_draft(task.id, task.draft()), task);
        assert!(task.is_backlog());
    }
}
