use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::BoardResult;
use sprintboard_domain::{
    NewUser, Sprint, SprintDraft, SprintId, Task, TaskDraft, TaskId, User, UserId,
};
use uuid::Uuid;

pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Metadata for persistence operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Durable storage for sprints, tasks and users.
///
/// Every backend enforces the same constraints:
/// - `Sprint::end` is unique
/// - `User::username` is unique
/// - a task's sprint and assignee must exist
/// - deleting a sprint deletes its tasks
/// - deleting a user unassigns its tasks
///
/// Ids are assigned by the store, increasing from 1.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn list_sprints(&self) -> BoardResult<Vec<Sprint>>;
    async fn get_sprint(&self, id: SprintId) -> BoardResult<Option<Sprint>>;
    async fn insert_sprint(&self, draft: SprintDraft) -> BoardResult<Sprint>;
    async fn update_sprint(&self, sprint: &Sprint) -> BoardResult<Sprint>;
    async fn delete_sprint(&self, id: SprintId) -> BoardResult<()>;

    async fn list_tasks(&self) -> BoardResult<Vec<Task>>;
    async fn get_task(&self, id: TaskId) -> BoardResult<Option<Task>>;
    async fn insert_task(&self, draft: TaskDraft) -> BoardResult<Task>;
    async fn update_task(&self, task: &Task) -> BoardResult<Task>;
    async fn delete_task(&self, id: TaskId) -> BoardResult<()>;

    async fn list_users(&self) -> BoardResult<Vec<User>>;
    async fn get_user(&self, id: UserId) -> BoardResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> BoardResult<Option<User>>;
    async fn find_user_by_token(&self, token: &str) -> BoardResult<Option<User>>;
    async fn insert_user(&self, new_user: NewUser) -> BoardResult<User>;
    async fn update_user(&self, user: &User) -> BoardResult<User>;
    async fn delete_user(&self, id: UserId) -> BoardResult<()>;
}
