use async_trait::async_trait;
use sprintboard_core::BoardResult;
use sprintboard_domain::{
    NewUser, Sprint, SprintDraft, SprintId, Task, TaskDraft, TaskId, User, UserId,
};
use tokio::sync::RwLock;

use crate::store::board_data::BoardData;
use crate::traits::EntityStore;

/// Receives the full table state after every successful mutation.
///
/// A failing journal aborts the mutation: the in-memory state is only
/// replaced once the journal accepted the new state.
#[async_trait]
pub trait Journal: Send + Sync {
    async fn record(&self, data: &BoardData) -> BoardResult<()>;
}

/// Journal that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJournal;

#[async_trait]
impl Journal for NoJournal {
    async fn record(&self, _data: &BoardData) -> BoardResult<()> {
        Ok(())
    }
}

/// Entity store over in-memory tables.
///
/// Readers share the lock; writers are serialised and each write is
/// applied to a copy, journaled, then swapped in.
pub struct TableStore<J> {
    data: RwLock<BoardData>,
    journal: J,
}

pub type MemoryStore = TableStore<NoJournal>;

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_journal(BoardData::default(), NoJournal)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: Journal> TableStore<J> {
    pub fn with_journal(data: BoardData, journal: J) -> Self {
        Self {
            data: RwLock::new(data),
            journal,
        }
    }

    async fn read<R>(&self, f: impl FnOnce(&BoardData) -> R) -> R {
        let guard = self.data.read().await;
        f(&guard)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut BoardData) -> BoardResult<R>) -> BoardResult<R> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let result = f(&mut next)?;
        self.journal.record(&next).await?;
        *guard = next;
        Ok(result)
    }
}

#[async_trait]
impl<J: Journal> EntityStore for TableStore<J> {
    async fn list_sprints(&self) -> BoardResult<Vec<Sprint>> {
        Ok(self.read(|data| data.sprints.clone()).await)
    }

    async fn get_sprint(&self, id: SprintId) -> BoardResult<Option<Sprint>> {
        Ok(self.read(|data| data.sprint(id).cloned()).await)
    }

    async fn insert_sprint(&self, draft: SprintDraft) -> BoardResult<Sprint> {
        self.write(|data| data.insert_sprint(draft)).await
    }

    async fn update_sprint(&self, sprint: &Sprint) -> BoardResult<Sprint> {
        self.write(|data| data.update_sprint(sprint)).await
    }

    async fn delete_sprint(&self, id: SprintId) -> BoardResult<()> {
        self.write(|data| data.delete_sprint(id)).await
    }

    async fn list_tasks(&self) -> BoardResult<Vec<Task>> {
        Ok(self.read(|data| data.tasks.clone()).await)
    }

    async fn get_task(&self, id: TaskId) -> BoardResult<Option<Task>> {
        Ok(self.read(|data| data.task(id).cloned()).await)
    }

    async fn insert_task(&self, draft: TaskDraft) -> BoardResult<Task> {
        self.write(|data| data.insert_task(draft)).await
    }

    async fn update_task(&self, task: &Task) -> BoardResult<Task> {
        self.write(|data| data.update_task(task)).await
    }

    async fn delete_task(&self, id: TaskId) -> BoardResult<()> {
        self.write(|data| data.delete_task(id)).await
    }

    async fn list_users(&self) -> BoardResult<Vec<User>> {
        Ok(self.read(|data| data.users.clone()).await)
    }

    async fn get_user(&self, id: UserId) -> BoardResult<Option<User>> {
        Ok(self.read(|data| data.user(id).cloned()).await)
    }

    async fn find_user_by_username(&self, username: &str) -> BoardResult<Option<User>> {
        Ok(self
            .read(|data| data.users.iter().find(|u| u.username == username).cloned())
            .await)
    }

    async fn find_user_by_token(&self, token: &str) -> BoardResult<Option<User>> {
        Ok(self
            .read(|data| data.users.iter().find(|u| u.token == token).cloned())
            .await)
    }

    async fn insert_user(&self, new_user: NewUser) -> BoardResult<User> {
        self.write(|data| data.insert_user(new_user)).await
    }

    async fn update_user(&self, user: &User) -> BoardResult<User> {
        self.write(|data| data.update_user(user)).await
    }

    async fn delete_user(&self, id: UserId) -> BoardResult<()> {
        self.write(|data| data.delete_user(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sprintboard_core::BoardError;

    struct FailingJournal;

    #[async_trait]
    impl Journal for FailingJournal {
        async fn record(&self, _data: &BoardData) -> BoardResult<()> {
            Err(BoardError::Internal("disk full".to_string()))
        }
    }

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let sprint = store.insert_sprint(SprintDraft::new(end())).await.unwrap();
        let task = store
            .insert_task(TaskDraft::new("a").in_sprint(sprint.id))
            .await
            .unwrap();

        assert_eq!(store.get_task(task.id).await.unwrap(), Some(task.clone()));
        assert_eq!(store.list_sprints().await.unwrap(), vec![sprint.clone()]);

        store.delete_sprint(sprint.id).await.unwrap();
        assert!(store.list_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_journal_leaves_state_untouched() {
        let store = TableStore::with_journal(BoardData::default(), FailingJournal);

        let result = store.insert_sprint(SprintDraft::new(end())).await;

        assert!(matches!(result, Err(BoardError::Internal(_))));
        assert!(store.list_sprints().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_lookup_by_token_and_username() {
        let store = MemoryStore::new();
        let user = store.insert_user(NewUser::new("alice", "pw").unwrap()).await.unwrap();

        let by_token = store.find_user_by_token(&user.token).await.unwrap();
        assert_eq!(by_token.map(|u| u.id), Some(user.id));

        let by_name = store.find_user_by_username("alice").await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(user.id));

        assert!(store.find_user_by_token("nope").await.unwrap().is_none());
    }
}
