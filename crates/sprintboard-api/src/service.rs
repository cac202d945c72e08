//! Write pipelines for sprints and tasks.
//!
//! Each write decodes the body, merges it onto the persisted value, checks
//! references, runs the mutation rules on the merged value and only then
//! touches the store.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde_json::Value;
use sprintboard_domain::validation::{validate_sprint_end, validate_task_write};
use sprintboard_domain::{
    FieldUpdate, Sprint, SprintDraft, SprintId, Task, TaskDraft, TaskId, User, UserId,
};
use sprintboard_persistence::EntityStore;

use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::payload::{self, WriteMode, REQUIRED};

#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl BoardService {
    pub fn new(store: Arc<dyn EntityStore>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { store, clock }
    }

    pub fn today(&self) -> NaiveDate {
        sprintboard_domain::today(self.clock.as_ref())
    }

    pub async fn sprint(&self, id: SprintId) -> ApiResult<Sprint> {
        self.store
            .get_sprint(id)
            .await?
            .ok_or_else(ApiError::not_found)
    }

    pub async fn task(&self, id: TaskId) -> ApiResult<Task> {
        self.store.get_task(id).await?.ok_or_else(ApiError::not_found)
    }

    pub async fn user_by_username(&self, username: &str) -> ApiResult<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(ApiError::not_found)
    }

    pub async fn create_sprint(&self, body: &Value) -> ApiResult<Sprint> {
        let update = payload::sprint_update(body, WriteMode::Create)?;
        let Some(end) = update.end else {
            return Err(ApiError::invalid("end", REQUIRED));
        };
        let mut draft = SprintDraft::new(end);
        draft.apply(update);

        validate_sprint_end(draft.end, None, self.today())?;
        let sprint = self.store.insert_sprint(draft).await?;
        tracing::info!(sprint_id = sprint.id, end = %sprint.end, "Created sprint");
        Ok(sprint)
    }

    pub async fn update_sprint(
        &self,
        id: SprintId,
        body: &Value,
        mode: WriteMode,
    ) -> ApiResult<Sprint> {
        let prior = self.sprint(id).await?;
        let update = payload::sprint_update(body, mode)?;
        let mut draft = prior.draft();
        draft.apply(update);

        validate_sprint_end(draft.end, Some(&prior), self.today())?;
        let sprint = self
            .store
            .update_sprint(&Sprint::from_draft(prior.id, draft))
            .await?;
        tracing::info!(sprint_id = sprint.id, "Updated sprint");
        Ok(sprint)
    }

    pub async fn delete_sprint(&self, id: SprintId) -> ApiResult<()> {
        self.store.delete_sprint(id).await?;
        tracing::info!(sprint_id = id, "Deleted sprint");
        Ok(())
    }

    pub async fn create_task(&self, body: &Value) -> ApiResult<Task> {
        let mut draft = TaskDraft::default();
        self.merge_task(&mut draft, body, WriteMode::Create).await?;
        let sprint = self.load_sprint(draft.sprint).await?;

        validate_task_write(&draft, sprint.as_ref(), None, self.today())?;
        let task = self.store.insert_task(draft).await?;
        tracing::info!(task_id = task.id, sprint_id = ?task.sprint, "Created task");
        Ok(task)
    }

    pub async fn update_task(&self, id: TaskId, body: &Value, mode: WriteMode) -> ApiResult<Task> {
        let prior = self.task(id).await?;
        let mut draft = prior.draft();
        self.merge_task(&mut draft, body, mode).await?;
        let sprint = self.load_sprint(draft.sprint).await?;

        validate_task_write(&draft, sprint.as_ref(), Some(&prior), self.today())?;
        let task = self
            .store
            .update_task(&Task::from_draft(prior.id, draft))
            .await?;
        tracing::info!(task_id = task.id, status = task.status.code(), "Updated task");
        Ok(task)
    }

    pub async fn delete_task(&self, id: TaskId) -> ApiResult<()> {
        self.store.delete_task(id).await?;
        tracing::info!(task_id = id, "Deleted task");
        Ok(())
    }

    /// Decode `body` onto `draft`, resolving the sprint and assignee it
    /// names. Unknown references are field errors.
    async fn merge_task(&self, draft: &mut TaskDraft, body: &Value, mode: WriteMode) -> ApiResult<()> {
        let input = payload::task_input(body, mode)?;
        let mut errors = FieldErrors::new();

        if let FieldUpdate::Set(id) = input.update.sprint {
            if self.store.get_sprint(id).await?.is_none() {
                errors.insert(
                    "sprint".to_string(),
                    vec![format!("Invalid pk \"{}\" - object does not exist.", id)],
                );
            }
        }

        let assigned = match input.assigned {
            FieldUpdate::Set(username) => match self.resolve_assignee(&username).await? {
                Ok(id) => FieldUpdate::Set(id),
                Err(message) => {
                    errors.insert("assigned".to_string(), vec![message]);
                    FieldUpdate::NoChange
                }
            },
            FieldUpdate::Clear => FieldUpdate::Clear,
            FieldUpdate::NoChange => FieldUpdate::NoChange,
        };

        if !errors.is_empty() {
            return Err(ApiError::Invalid(errors));
        }

        let mut update = input.update;
        update.assigned = assigned;
        draft.apply(update);
        Ok(())
    }

    /// The active user called `username`, or the message explaining why it
    /// cannot be assigned.
    async fn resolve_assignee(&self, username: &str) -> ApiResult<Result<UserId, String>> {
        Ok(match self.store.find_user_by_username(username).await? {
            Some(user) if user.is_active => Ok(user.id),
            Some(_) => Err(format!("User {} is inactive.", username)),
            None => Err(format!("Object with username={} does not exist.", username)),
        })
    }

    async fn load_sprint(&self, id: Option<SprintId>) -> ApiResult<Option<Sprint>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let sprint = self.store.get_sprint(id).await?.ok_or_else(|| {
            ApiError::invalid(
                "sprint",
                format!("Invalid pk \"{}\" - object does not exist.", id),
            )
        })?;
        Ok(Some(sprint))
    }
}
