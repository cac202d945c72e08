use axum::http::Uri;
use chrono::NaiveDate;
use serde::Serialize;
use sprintboard_core::Page;
use sprintboard_domain::{Sprint, SprintId, Task, TaskId, TaskStatus, User, UserId};

use crate::links::Links;

#[derive(Debug, Clone, Serialize)]
pub struct SprintLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub tasks: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SprintBody {
    pub id: SprintId,
    pub name: String,
    pub description: String,
    pub end: NaiveDate,
    pub links: SprintLinks,
}

impl SprintBody {
    pub fn new(sprint: Sprint, links: &Links) -> Self {
        Self {
            links: SprintLinks {
                self_link: links.sprint(sprint.id),
                tasks: links.tasks_in_sprint(sprint.id),
            },
            id: sprint.id,
            name: sprint.name,
            description: sprint.description,
            end: sprint.end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub sprint: Option<String>,
    pub assigned: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskBody {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub sprint: Option<SprintId>,
    pub status: TaskStatus,
    pub order: i16,
    /// Assignee's username.
    pub assigned: Option<String>,
    pub started: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub completed: Option<NaiveDate>,
    pub status_display: &'static str,
    pub links: TaskLinks,
}

impl TaskBody {
    /// `assignee` is the username behind `task.assigned`, if any.
    pub fn new(task: Task, assignee: Option<String>, links: &Links) -> Self {
        Self {
            links: TaskLinks {
                self_link: links.task(task.id),
                sprint: task.sprint.map(|id| links.sprint(id)),
                assigned: assignee.as_deref().map(|username| links.user(username)),
            },
            id: task.id,
            name: task.name,
            description: task.description,
            sprint: task.sprint,
            status: task.status,
            order: task.order,
            assigned: assignee,
            started: task.started,
            due: task.due,
            completed: task.completed,
            status_display: task.status.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Public view of a user; credentials never leave the store.
#[derive(Debug, Clone, Serialize)]
pub struct UserBody {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub is_active: bool,
    pub links: UserLinks,
}

impl UserBody {
    pub fn new(user: User, links: &Links) -> Self {
        Self {
            links: UserLinks {
                self_link: links.user(&user.username),
            },
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            is_active: user.is_active,
        }
    }
}

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize)]
pub struct PageBody<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> PageBody<T> {
    pub fn new(page: Page<T>, uri: &Uri, links: &Links) -> Self {
        Self {
            next: page.next_page().map(|n| links.page(uri, n)),
            previous: page.previous_page().map(|n| links.page(uri, n)),
            count: page.count,
            results: page.items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiRootBody {
    pub sprints: String,
    pub tasks: String,
    pub users: String,
}
