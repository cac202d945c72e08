//! HTTP resource layer: sprints, tasks and read-only users as JSON.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod links;
pub mod listing;
pub mod payload;
pub mod representation;
pub mod request_tracing;
pub mod service;

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use mockable::{Clock, DefaultClock};
use sprintboard_core::AppConfig;
use sprintboard_persistence::EntityStore;
use tokio::net::TcpListener;

pub use error::{ApiError, ApiResult};
pub use service::BoardService;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: AppConfig) -> Self {
        Self {
            store,
            clock: Arc::new(DefaultClock),
            config: Arc::new(config),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    pub fn service(&self) -> BoardService {
        BoardService::new(Arc::clone(&self.store), Arc::clone(&self.clock))
    }
}

pub fn build_router(state: AppState) -> Router {
    use handlers::{root, sprints, tasks, users};

    let api = Router::new()
        .route("/api/", get(root::api_root))
        .route("/api/sprints/", get(sprints::list).post(sprints::create))
        .route(
            "/api/sprints/{id}/",
            get(sprints::detail)
                .put(sprints::replace)
                .patch(sprints::update)
                .delete(sprints::delete),
        )
        .route("/api/tasks/", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/{id}/",
            get(tasks::detail)
                .put(tasks::replace)
                .patch(tasks::update)
                .delete(tasks::delete),
        )
        .route("/api/users/", get(users::list))
        .route("/api/users/{username}/", get(users::detail))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/healthz", get(root::healthz))
        .merge(api)
        .layer(middleware::from_fn(request_tracing::trace_request))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutting down"),
                Err(e) => {
                    tracing::warn!("Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
}
