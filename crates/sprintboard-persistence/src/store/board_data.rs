//! In-memory tables and the referential rules applied to them.

use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::{
    NewUser, Sprint, SprintDraft, SprintId, Task, TaskDraft, TaskId, User, UserId,
};

pub(crate) fn duplicate_end() -> BoardError {
    BoardError::UniqueViolation {
        field: "end".to_string(),
        message: "sprint with this end already exists.".to_string(),
    }
}

pub(crate) fn duplicate_username() -> BoardError {
    BoardError::UniqueViolation {
        field: "username".to_string(),
        message: "A user with that username already exists.".to_string(),
    }
}

pub(crate) fn missing_reference(field: &str, id: i64) -> BoardError {
    BoardError::InvalidReference {
        field: field.to_string(),
        message: format!("Invalid pk \"{}\" - object does not exist.", id),
    }
}

/// Everything the board stores, as one serialisable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardData {
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    last_sprint_id: SprintId,
    #[serde(default)]
    last_task_id: TaskId,
    #[serde(default)]
    last_user_id: UserId,
}

impl BoardData {
    pub fn sprint(&self, id: SprintId) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn insert_sprint(&mut self, draft: SprintDraft) -> BoardResult<Sprint> {
        if self.sprints.iter().any(|s| s.end == draft.end) {
            return Err(duplicate_end());
        }
        self.last_sprint_id += 1;
        let sprint = Sprint::from_draft(self.last_sprint_id, draft);
        self.sprints.push(sprint.clone());
        Ok(sprint)
    }

    pub fn update_sprint(&mut self, sprint: &Sprint) -> BoardResult<Sprint> {
        if self
            .sprints
            .iter()
            .any(|s| s.id != sprint.id && s.end == sprint.end)
        {
            return Err(duplicate_end());
        }
        let slot = self
            .sprints
            .iter_mut()
            .find(|s| s.id == sprint.id)
            .ok_or_else(|| BoardError::not_found("Sprint", sprint.id))?;
        *slot = sprint.clone();
        Ok(sprint.clone())
    }

    /// Remove a sprint together with every task scheduled in it.
    pub fn delete_sprint(&mut self, id: SprintId) -> BoardResult<()> {
        if self.sprint(id).is_none() {
            return Err(BoardError::not_found("Sprint", id));
        }
        self.sprints.retain(|s| s.id != id);
        let before = self.tasks.len();
        self.tasks.retain(|t| t.sprint != Some(id));
        tracing::debug!(
            "Deleted sprint {} and {} of its tasks",
            id,
            before - self.tasks.len()
        );
        Ok(())
    }

    fn check_task_references(&self, sprint: Option<SprintId>, assigned: Option<UserId>) -> BoardResult<()> {
        if let Some(id) = sprint {
            if self.sprint(id).is_none() {
                return Err(missing_reference("sprint", id));
            }
        }
        if let Some(id) = assigned {
            if self.user(id).is_none() {
                return Err(missing_reference("assigned", id));
            }
        }
        Ok(())
    }

    pub fn insert_task(&mut self, draft: TaskDraft) -> BoardResult<Task> {
        self.check_task_references(draft.sprint, draft.assigned)?;
        self.last_task_id += 1;
        let task = Task::from_draft(self.last_task_id, draft);
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, task: &Task) -> BoardResult<Task> {
        self.check_task_references(task.sprint, task.assigned)?;
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| BoardError::not_found("Task", task.id))?;
        *slot = task.clone();
        Ok(task.clone())
    }

    pub fn delete_task(&mut self, id: TaskId) -> BoardResult<()> {
        if self.task(id).is_none() {
            return Err(BoardError::not_found("Task", id));
        }
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    pub fn insert_user(&mut self, new_user: NewUser) -> BoardResult<User> {
        if self.users.iter().any(|u| u.username == new_user.username) {
            return Err(duplicate_username());
        }
        self.last_user_id += 1;
        let user = User::from_new(self.last_user_id, new_user);
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn update_user(&mut self, user: &User) -> BoardResult<User> {
        if self
            .users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(duplicate_username());
        }
        let slot = self
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| BoardError::not_found("User", user.id))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    /// Remove a user; their tasks stay but lose the assignee.
    pub fn delete_user(&mut self, id: UserId) -> BoardResult<()> {
        if self.user(id).is_none() {
            return Err(BoardError::not_found("User", id));
        }
        self.users.retain(|u| u.id != id);
        for task in self.tasks.iter_mut().filter(|t| t.assigned == Some(id)) {
            task.assigned = None;
        }
        Ok(())
    }
}
