use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::{Extension, Json};
use serde_json::Value;
use sprintboard_domain::{Task, TaskQuery, UserId};
use sprintboard_persistence::EntityStore;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::handlers::parse_id;
use crate::links::Links;
use crate::listing::ListParams;
use crate::payload::WriteMode;
use crate::representation::{PageBody, TaskBody};
use crate::AppState;

async fn usernames(store: &dyn EntityStore) -> ApiResult<HashMap<UserId, String>> {
    Ok(store
        .list_users()
        .await?
        .into_iter()
        .map(|user| (user.id, user.username))
        .collect())
}

async fn task_body(store: &dyn EntityStore, task: Task, links: &Links) -> ApiResult<TaskBody> {
    let assignee = match task.assigned {
        Some(id) => store.get_user(id).await?.map(|user| user.username),
        None => None,
    };
    Ok(TaskBody::new(task, assignee, links))
}

pub async fn list(
    State(state): State<AppState>,
    links: Links,
    uri: Uri,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Json<PageBody<TaskBody>>> {
    let mut params = ListParams::new(raw);
    let mut query = TaskQuery::new().order_by(params.ordering());
    if let Some(search) = params.search() {
        query = query.search(search);
    }
    if let Some(sprint) = params.sprint_id("sprint") {
        query = query.in_sprint(sprint);
    }
    if let Some(status) = params.status("status") {
        query = query.with_status(status);
    }
    if let Some(backlog) = params.boolean("backlog") {
        query = query.backlog(backlog);
    }
    params.finish()?;
    let request = params.page_request(&state.config)?;

    let names = usernames(state.store.as_ref()).await?;
    // An unknown assignee matches no task.
    let mut matches_nobody = false;
    if let Some(username) = params.text("assigned") {
        match names.iter().find(|(_, name)| **name == username) {
            Some((id, _)) => query = query.assigned_to(*id),
            None => matches_nobody = true,
        }
    }

    let tasks = if matches_nobody {
        Vec::new()
    } else {
        query.execute(state.store.list_tasks().await?)
    };
    let page = request.paginate(tasks)?.map(|task| {
        let assignee = task.assigned.and_then(|id| names.get(&id).cloned());
        TaskBody::new(task, assignee, &links)
    });
    Ok(Json(PageBody::new(page, &uri, &links)))
}

pub async fn detail(
    State(state): State<AppState>,
    links: Links,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskBody>> {
    let task = state.service().task(parse_id(&id)?).await?;
    Ok(Json(task_body(state.store.as_ref(), task, &links).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    links: Links,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskBody>)> {
    let Json(body) = body?;
    let task = state.service().create_task(&body).await?;
    tracing::debug!(user = %caller.username, task_id = task.id, "Task created by caller");
    let body = task_body(state.store.as_ref(), task, &links).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

async fn write(
    state: AppState,
    links: Links,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<TaskBody>> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let task = state.service().update_task(id, &body, mode).await?;
    Ok(Json(task_body(state.store.as_ref(), task, &links).await?))
}

pub async fn replace(
    State(state): State<AppState>,
    links: Links,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<TaskBody>> {
    write(state, links, id, body, WriteMode::Replace).await
}

pub async fn update(
    State(state): State<AppState>,
    links: Links,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<TaskBody>> {
    write(state, links, id, body, WriteMode::Partial).await
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.service().delete_task(id).await?;
    tracing::debug!(user = %caller.username, task_id = id, "Task deleted by caller");
    Ok(StatusCode::NO_CONTENT)
}
