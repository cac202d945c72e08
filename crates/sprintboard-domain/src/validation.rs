//! Sprint and task mutation rules.
//!
//! Pure functions over a proposed value, the persisted value it replaces (if
//! any) and the current date. Each check reports at most one rejection.

use chrono::NaiveDate;
use mockable::Clock;
use thiserror::Error;

use crate::sprint::Sprint;
use crate::task::{Task, TaskDraft, TaskStatus};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("End Date cannot be in the past.")]
    EndDateInPast,

    #[error("Cannot change the sprint of a completed task.")]
    SprintChangeOnCompletedTask,

    #[error("Cannot assign tasks to past sprints.")]
    AssignToPastSprint,

    #[error("Cannot add tasks to past sprints.")]
    AddToPastSprint,

    #[error("Backlog tasks must have 'Not Started' status.")]
    BacklogMustBeNotStarted,

    #[error("Started date cannot be set for not started tasks.")]
    StartedDateOnNotStarted,

    #[error("Completed date cannot be set for uncompleted tasks.")]
    CompletedDateOnUnfinished,

    #[error("Completed date cannot be empty for completed tasks.")]
    DoneRequiresCompletedDate,
}

impl ValidationError {
    /// Field the rejection is reported under.
    pub const fn field(self) -> &'static str {
        match self {
            Self::EndDateInPast => "end",
            Self::SprintChangeOnCompletedTask | Self::AssignToPastSprint | Self::AddToPastSprint => {
                "sprint"
            }
            Self::BacklogMustBeNotStarted
            | Self::StartedDateOnNotStarted
            | Self::CompletedDateOnUnfinished
            | Self::DoneRequiresCompletedDate => NON_FIELD_ERRORS,
        }
    }
}

/// The current UTC calendar date according to `clock`.
pub fn today<C: Clock + ?Sized>(clock: &C) -> NaiveDate {
    clock.utc().date_naive()
}

/// `end` may not be in the past on creation, nor moved into the past.
///
/// Leaving an already-past `end` untouched is always accepted.
pub fn validate_sprint_end(
    proposed_end: NaiveDate,
    prior: Option<&Sprint>,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    let is_new = prior.is_none();
    let is_changed = prior.is_some_and(|sprint| sprint.end != proposed_end);

    if (is_new || is_changed) && proposed_end < today {
        return Err(ValidationError::EndDateInPast);
    }
    Ok(())
}

/// Sprint membership rules for a task that already exists.
///
/// `proposed` is the sprint the task will point at after the write. New
/// tasks (`prior` is `None`) are not checked.
pub fn validate_task_sprint(
    proposed: Option<&Sprint>,
    prior: Option<&Task>,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    let Some(prior) = prior else {
        return Ok(());
    };

    let proposed_is_past = proposed.is_some_and(|sprint| sprint.is_past(today));

    if proposed.map(|sprint| sprint.id) != prior.sprint {
        if prior.status == TaskStatus::Done {
            return Err(ValidationError::SprintChangeOnCompletedTask);
        }
        if proposed_is_past {
            return Err(ValidationError::AssignToPastSprint);
        }
    } else if proposed_is_past {
        return Err(ValidationError::AddToPastSprint);
    }
    Ok(())
}

/// Status and date consistency. Rules are checked in priority order and the
/// first violation wins.
pub fn validate_task(proposed: &TaskDraft) -> Result<(), ValidationError> {
    if proposed.sprint.is_none() && proposed.status != TaskStatus::NotStarted {
        return Err(ValidationError::BacklogMustBeNotStarted);
    }
    if proposed.started.is_some() && proposed.status == TaskStatus::NotStarted {
        return Err(ValidationError::StartedDateOnNotStarted);
    }
    if proposed.completed.is_some() && proposed.status != TaskStatus::Done {
        return Err(ValidationError::CompletedDateOnUnfinished);
    }
    if proposed.status == TaskStatus::Done && proposed.completed.is_none() {
        return Err(ValidationError::DoneRequiresCompletedDate);
    }
    Ok(())
}

/// Full task check: sprint membership first, then status and dates.
///
/// `sprint` must be the sprint `proposed.sprint` refers to.
pub fn validate_task_write(
    proposed: &TaskDraft,
    sprint: Option<&Sprint>,
    prior: Option<&Task>,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    debug_assert_eq!(proposed.sprint, sprint.map(|s| s.id));
    validate_task_sprint(sprint, prior, today)?;
    validate_task(proposed)
}
