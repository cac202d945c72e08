use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::{Extension, Json};
use serde_json::Value;
use sprintboard_domain::SprintQuery;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::handlers::parse_id;
use crate::links::Links;
use crate::listing::ListParams;
use crate::payload::WriteMode;
use crate::representation::{PageBody, SprintBody};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    links: Links,
    uri: Uri,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Json<PageBody<SprintBody>>> {
    let mut params = ListParams::new(raw);
    let mut query = SprintQuery::new().order_by(params.ordering());
    if let Some(search) = params.search() {
        query = query.search(search);
    }
    if let Some(min) = params.date("end_min") {
        query = query.ends_after(min);
    }
    if let Some(max) = params.date("end_max") {
        query = query.ends_before(max);
    }
    params.finish()?;
    let request = params.page_request(&state.config)?;

    let sprints = query.execute(state.store.list_sprints().await?);
    let page = request
        .paginate(sprints)?
        .map(|sprint| SprintBody::new(sprint, &links));
    Ok(Json(PageBody::new(page, &uri, &links)))
}

pub async fn detail(
    State(state): State<AppState>,
    links: Links,
    Path(id): Path<String>,
) -> ApiResult<Json<SprintBody>> {
    let sprint = state.service().sprint(parse_id(&id)?).await?;
    Ok(Json(SprintBody::new(sprint, &links)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    links: Links,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SprintBody>)> {
    let Json(body) = body?;
    let sprint = state.service().create_sprint(&body).await?;
    tracing::debug!(user = %caller.username, sprint_id = sprint.id, "Sprint created by caller");
    Ok((StatusCode::CREATED, Json(SprintBody::new(sprint, &links))))
}

async fn write(
    state: AppState,
    links: Links,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<SprintBody>> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let sprint = state.service().update_sprint(id, &body, mode).await?;
    Ok(Json(SprintBody::new(sprint, &links)))
}

pub async fn replace(
    State(state): State<AppState>,
    links: Links,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SprintBody>> {
    write(state, links, id, body, WriteMode::Replace).await
}

pub async fn update(
    State(state): State<AppState>,
    links: Links,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SprintBody>> {
    write(state, links, id, body, WriteMode::Partial).await
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.service().delete_sprint(id).await?;
    tracing::debug!(user = %caller.username, sprint_id = id, "Sprint deleted by caller");
    Ok(StatusCode::NO_CONTENT)
}
