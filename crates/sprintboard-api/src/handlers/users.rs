use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::Json;
use sprintboard_domain::UserQuery;

use crate::error::ApiResult;
use crate::links::Links;
use crate::listing::ListParams;
use crate::representation::{PageBody, UserBody};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    links: Links,
    uri: Uri,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Json<PageBody<UserBody>>> {
    let params = ListParams::new(raw);
    let mut query = UserQuery::new();
    if let Some(search) = params.search() {
        query = query.search(search);
    }
    let request = params.page_request(&state.config)?;

    let users = query.execute(state.store.list_users().await?);
    let page = request
        .paginate(users)?
        .map(|user| UserBody::new(user, &links));
    Ok(Json(PageBody::new(page, &uri, &links)))
}

pub async fn detail(
    State(state): State<AppState>,
    links: Links,
    Path(username): Path<String>,
) -> ApiResult<Json<UserBody>> {
    let user = state.service().user_by_username(&username).await?;
    Ok(Json(UserBody::new(user, &links)))
}
