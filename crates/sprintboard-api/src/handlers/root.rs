use axum::Json;
use serde_json::{json, Value};

use crate::links::Links;
use crate::representation::ApiRootBody;

pub async fn api_root(links: Links) -> Json<ApiRootBody> {
    Json(ApiRootBody {
        sprints: links.sprints(),
        tasks: links.tasks(),
        users: links.users(),
    })
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
