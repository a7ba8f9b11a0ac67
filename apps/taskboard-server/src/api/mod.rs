//! JSON API endpoints.

pub mod auth;
pub mod dashboard;
pub mod task;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use task_store::TaskStore;

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Creates the API router.
///
/// Everything except registration, login and the health check requires an
/// access token.
pub fn create_router<S: TaskStore + 'static>(state: Arc<AppState<S>>) -> Router<Arc<AppState<S>>> {
    let protected = Router::new()
        // Auth endpoints
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/profile", get(auth::get_profile))
        // Dashboard
        .route("/api/dashboard", get(dashboard::get_dashboard))
        // Task endpoints
        .route("/api/tasks", get(task::list_tasks).post(task::create_task))
        .route("/api/tasks/:id", put(task::update_task))
        .route("/api/tasks/:id/report", get(task::get_task_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware::<S>));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/health", get(health_check))
        .merge(protected)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
