//! Form-based management panel.
//!
//! The panel reuses the services behind the JSON API. Successful writes and
//! permission denials redirect with a `flash` message; validation errors and
//! everything else answer like the JSON API does.

pub mod accounts;
pub mod auth;
pub mod home;
pub mod tasks;

use std::sync::Arc;

use axum::{
    Router, middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use task_store::TaskStore;

use crate::error::ServerError;
use crate::middleware::auth_middleware;
use crate::state::AppState;

pub const DASHBOARD_PATH: &str = "/panel/";
pub const LOGIN_PATH: &str = "/panel/login";
pub const USERS_PATH: &str = "/panel/users";
pub const ADMINS_PATH: &str = "/panel/admins";
pub const TASKS_PATH: &str = "/panel/tasks";

/// Creates the panel router.
pub fn create_router<S: TaskStore + 'static>(state: Arc<AppState<S>>) -> Router<Arc<AppState<S>>> {
    let protected = Router::new()
        .route("/panel", get(home::home))
        .route(DASHBOARD_PATH, get(home::home))
        // User management
        .route(USERS_PATH, get(accounts::list_users))
        .route("/panel/users/create", post(accounts::create_user))
        .route("/panel/users/:id/update", post(accounts::update_user))
        .route("/panel/users/:id/delete", post(accounts::delete_user))
        // Admin management
        .route(ADMINS_PATH, get(accounts::list_admins))
        .route("/panel/admins/create", post(accounts::create_admin))
        .route("/panel/admins/:id/update", post(accounts::update_admin))
        .route("/panel/admins/:id/delete", post(accounts::delete_admin))
        .route("/panel/assign-user", post(accounts::assign_user))
        // Tasks
        .route(TASKS_PATH, get(tasks::list_tasks))
        .route("/panel/tasks/create", post(tasks::create_task))
        .route("/panel/tasks/:id/update", post(tasks::update_task))
        .route("/panel/tasks/:id/report", get(tasks::task_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware::<S>));

    Router::new()
        .route(LOGIN_PATH, get(auth::login_page).post(auth::login))
        .route("/panel/logout", post(auth::logout))
        .merge(protected)
}

/// Redirects (303) to a panel page with a flash message.
pub fn redirect_with_flash(to: &str, flash: &str) -> Redirect {
    Redirect::to(&format!("{to}?flash={}", urlencoding::encode(flash)))
}

/// Panel error type.
#[derive(Debug)]
pub enum PanelError {
    /// Refused; the client is sent elsewhere with the reason.
    Redirect { to: &'static str, flash: String },
    /// Anything else, answered like the JSON API.
    Server(ServerError),
}

impl PanelError {
    /// Turns permission denials into a redirect to `to`.
    pub fn denied_to(to: &'static str) -> impl Fn(ServerError) -> PanelError {
        move |error| match error {
            ServerError::Denied(denial) => {
                tracing::debug!(%denial, to, "Panel request denied");
                PanelError::Redirect {
                    to,
                    flash: denial.to_string(),
                }
            }
            other => PanelError::Server(other),
        }
    }
}

impl From<ServerError> for PanelError {
    fn from(error: ServerError) -> Self {
        Self::Server(error)
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        match self {
            PanelError::Redirect { to, flash } => redirect_with_flash(to, &flash).into_response(),
            PanelError::Server(error) => error.into_response(),
        }
    }
}

/// Result type alias for panel handlers.
pub type PanelResult<T> = Result<T, PanelError>;
