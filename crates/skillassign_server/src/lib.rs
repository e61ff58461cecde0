//! HTTP surface over the skill assignment services.
//!
//! Every handler runs its SQLite work on the blocking pool with a fresh
//! connection; reassignment runs are serialized per project.

pub mod api;
pub mod error;
pub mod state;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use log::warn;
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;
pub use state::AppState;

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let router = Router::new()
        .route("/health", get(api::health::health))
        .route(
            "/projects/{project_id}/skill-assessments",
            get(api::assessments::list_assessments).post(api::assessments::record_assessment),
        )
        .route(
            "/projects/{project_id}/skill-assessments/submit",
            post(api::assessments::submit_assessment),
        )
        .route(
            "/projects/{project_id}/skill-assessments/reassign",
            post(api::assessments::reassign),
        )
        .route(
            "/projects/{project_id}/skill-assessments/users/{user_id}",
            get(api::assessments::get_assessment).delete(api::assessments::reset_assessment),
        )
        .route("/projects/{project_id}/tasks", get(api::tasks::list_tasks))
        .route("/tasks/{task_id}/start", post(api::tasks::start_task))
        .route("/tasks/{task_id}/complete", post(api::tasks::complete_task))
        .with_state(state);

    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("event=cors_config module=server status=skip reason=invalid_origin");
                None
            }
        })
        .collect();
    Some(
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
