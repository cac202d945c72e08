use crate::store::board_data::{duplicate_end, duplicate_username, missing_reference};
use crate::traits::EntityStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::{
    NewUser, Sprint, SprintDraft, SprintId, Task, TaskDraft, TaskId, TaskStatus, User, UserId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const SCHEMA: &str = include_str!("../schema.sql");
const DATE_FORMAT: &str = "%Y-%m-%d";

const SPRINT_COLUMNS: &str = r#"id, name, description, "end""#;
const TASK_COLUMNS: &str = r#"id, name, description, sprint_id, "order", assigned_id,
    started, due, completed, status"#;
const USER_COLUMNS: &str = "id, username, full_name, is_active, password_hash, token";

/// Entity store backed by a SQLite database file.
///
/// The schema enforces the same constraints as the in-memory tables;
/// cascades run through `ON DELETE` clauses.
pub struct SqliteStore {
    path: PathBuf,
    pool: tokio::sync::OnceCell<Pool<Sqlite>>,
}

fn db_err(e: sqlx::Error) -> BoardError {
    BoardError::Database(e.to_string())
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> BoardResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| BoardError::Database(format!("bad date {:?}: {}", value, e)))
}

fn parse_optional_date(value: Option<String>) -> BoardResult<Option<NaiveDate>> {
    value.as_deref().map(parse_date).transpose()
}

/// Translate constraint failures into the same errors the other backends
/// report.
fn map_write_err(e: sqlx::Error) -> BoardError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            let message = db.message();
            if message.contains("sprints.end") {
                return duplicate_end();
            }
            if message.contains("users.username") {
                return duplicate_username();
            }
        }
    }
    db_err(e)
}

fn row_to_sprint(row: &SqliteRow) -> BoardResult<Sprint> {
    Ok(Sprint {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        end: parse_date(row.get::<&str, _>("end"))?,
    })
}

fn row_to_task(row: &SqliteRow) -> BoardResult<Task> {
    let code: i64 = row.get("status");
    let status = u8::try_from(code)
        .ok()
        .and_then(|code| TaskStatus::try_from(code).ok())
        .ok_or_else(|| BoardError::Database(format!("bad status code {}", code)))?;

    Ok(Task {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        sprint: row.get("sprint_id"),
        order: row.get("order"),
        assigned: row.get("assigned_id"),
        started: parse_optional_date(row.get("started"))?,
        due: parse_optional_date(row.get("due"))?,
        completed: parse_optional_date(row.get("completed"))?,
        status,
    })
}

fn row_to_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        is_active: row.get("is_active"),
        password_hash: row.get("password_hash"),
        token: row.get("token"),
    }
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pool: tokio::sync::OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn get_pool(&self) -> BoardResult<&Pool<Sqlite>> {
        self.pool
            .get_or_try_init(|| async {
                let options = SqliteConnectOptions::from_str(&format!(
                    "sqlite://{}?mode=rwc",
                    self.path.display()
                ))
                .map_err(db_err)?
                .create_if_missing(true)
                .foreign_keys(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(db_err)?;

                sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(db_err)?;
                tracing::info!("Opened SQLite store at {}", self.path.display());

                Ok(pool)
            })
            .await
    }

    /// Reject dangling sprint or assignee references with the field named.
    async fn check_task_references(
        &self,
        pool: &Pool<Sqlite>,
        sprint: Option<SprintId>,
        assigned: Option<UserId>,
    ) -> BoardResult<()> {
        if let Some(id) = sprint {
            let found = sqlx::query("SELECT 1 FROM sprints WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(db_err)?;
            if found.is_none() {
                return Err(missing_reference("sprint", id));
            }
        }
        if let Some(id) = assigned {
            let found = sqlx::query("SELECT 1 FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(db_err)?;
            if found.is_none() {
                return Err(missing_reference("assigned", id));
            }
        }
        Ok(())
    }

    async fn delete_row(&self, table: &str, kind: &str, id: i64) -> BoardResult<()> {
        let pool = self.get_pool().await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(BoardError::not_found(kind, id));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn list_sprints(&self) -> BoardResult<Vec<Sprint>> {
        let pool = self.get_pool().await?;
        sqlx::query(&format!("SELECT {} FROM sprints ORDER BY id", SPRINT_COLUMNS))
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(row_to_sprint)
            .collect()
    }

    async fn get_sprint(&self, id: SprintId) -> BoardResult<Option<Sprint>> {
        let pool = self.get_pool().await?;
        sqlx::query(&format!("SELECT {} FROM sprints WHERE id = ?", SPRINT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(row_to_sprint)
            .transpose()
    }

    async fn insert_sprint(&self, draft: SprintDraft) -> BoardResult<Sprint> {
        let pool = self.get_pool().await?;
        let result = sqlx::query(r#"INSERT INTO sprints (name, description, "end") VALUES (?, ?, ?)"#)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(format_date(draft.end))
            .execute(pool)
            .await
            .map_err(map_write_err)?;
        Ok(Sprint::from_draft(result.last_insert_rowid(), draft))
    }

    async fn update_sprint(&self, sprint: &Sprint) -> BoardResult<Sprint> {
        let pool = self.get_pool().await?;
        let result =
            sqlx::query(r#"UPDATE sprints SET name = ?, description = ?, "end" = ? WHERE id = ?"#)
                .bind(&sprint.name)
                .bind(&sprint.description)
                .bind(format_date(sprint.end))
                .bind(sprint.id)
                .execute(pool)
                .await
                .map_err(map_write_err)?;
        if result.rows_affected() == 0 {
            return Err(BoardError::not_found("Sprint", sprint.id));
        }
        Ok(sprint.clone())
    }

    async fn delete_sprint(&self, id: SprintId) -> BoardResult<()> {
        self.delete_row("sprints", "Sprint", id).await
    }

    async fn list_tasks(&self) -> BoardResult<Vec<Task>> {
        let pool = self.get_pool().await?;
        sqlx::query(&format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS))
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(row_to_task)
            .collect()
    }

    async fn get_task(&self, id: TaskId) -> BoardResult<Option<Task>> {
        let pool = self.get_pool().await?;
        sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(row_to_task)
            .transpose()
    }

    async fn insert_task(&self, draft: TaskDraft) -> BoardResult<Task> {
        let pool = self.get_pool().await?;
        self.check_task_references(pool, draft.sprint, draft.assigned)
            .await?;
        let result = sqlx::query(
            r#"INSERT INTO tasks (name, description, sprint_id, "order", assigned_id,
                started, due, completed, status)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.sprint)
        .bind(draft.order)
        .bind(draft.assigned)
        .bind(draft.started.map(format_date))
        .bind(draft.due.map(format_date))
        .bind(draft.completed.map(format_date))
        .bind(i64::from(draft.status.code()))
        .execute(pool)
        .await
        .map_err(map_write_err)?;
        Ok(Task::from_draft(result.last_insert_rowid(), draft))
    }

    async fn update_task(&self, task: &Task) -> BoardResult<Task> {
        let pool = self.get_pool().await?;
        self.check_task_references(pool, task.sprint, task.assigned)
            .await?;
        let result = sqlx::query(
            r#"UPDATE tasks SET name = ?, description = ?, sprint_id = ?, "order" = ?,
                assigned_id = ?, started = ?, due = ?, completed = ?, status = ?
               WHERE id = ?"#,
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.sprint)
        .bind(task.order)
        .bind(task.assigned)
        .bind(task.started.map(format_date))
        .bind(task.due.map(format_date))
        .bind(task.completed.map(format_date))
        .bind(i64::from(task.status.code()))
        .bind(task.id)
        .execute(pool)
        .await
        .map_err(map_write_err)?;
        if result.rows_affected() == 0 {
            return Err(BoardError::not_found("Task", task.id));
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> BoardResult<()> {
        self.delete_row("tasks", "Task", id).await
    }

    async fn list_users(&self) -> BoardResult<Vec<User>> {
        let pool = self.get_pool().await?;
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(row_to_user).collect())
    }

    async fn get_user(&self, id: UserId) -> BoardResult<Option<User>> {
        let pool = self.get_pool().await?;
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_user_by_username(&self, username: &str) -> BoardResult<Option<User>> {
        let pool = self.get_pool().await?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(db_err)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_user_by_token(&self, token: &str) -> BoardResult<Option<User>> {
        let pool = self.get_pool().await?;
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE token = ?", USER_COLUMNS))
            .bind(token)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn insert_user(&self, new_user: NewUser) -> BoardResult<User> {
        let pool = self.get_pool().await?;
        let result = sqlx::query(
            "INSERT INTO users (username, full_name, is_active, password_hash, token)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.full_name)
        .bind(new_user.is_active)
        .bind(&new_user.password_hash)
        .bind(&new_user.token)
        .execute(pool)
        .await
        .map_err(map_write_err)?;
        Ok(User::from_new(result.last_insert_rowid(), new_user))
    }

    async fn update_user(&self, user: &User) -> BoardResult<User> {
        let pool = self.get_pool().await?;
        let result = sqlx::query(
            "UPDATE users SET username = ?, full_name = ?, is_active = ?, password_hash = ?,
                token = ? WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(&user.password_hash)
        .bind(&user.token)
        .bind(user.id)
        .execute(pool)
        .await
        .map_err(map_write_err)?;
        if result.rows_affected() == 0 {
            return Err(BoardError::not_found("User", user.id));
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> BoardResult<()> {
        self.delete_row("users", "User", id).await
    }
}
