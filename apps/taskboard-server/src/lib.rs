//! Taskboard Server
//!
//! Serves the JSON API and the management panel over one shared state.
//! Every task and identity operation goes through the authorization engine
//! in the `auth` crate.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod panel;
pub mod services;
pub mod state;

use std::sync::Arc;

use auth::{DEFAULT_JWT_ISSUER, JwtConfig, JwtManager};
use axum::Router;
use task_store::TaskStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::{AppState, create_shared_state};

/// Creates the application router with all routes configured.
pub fn create_app<S: TaskStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router(state.clone())
        .merge(panel::create_router(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: TaskStore>(config: Config, store: S) -> Arc<AppState<S>> {
    let jwt_config = JwtConfig::new(config.jwt_secret.as_str())
        .with_expiration_hours(config.jwt_expiration_hours)
        .with_issuer(DEFAULT_JWT_ISSUER);
    let jwt_manager = JwtManager::new(jwt_config);

    create_shared_state(config, store, jwt_manager)
}

/// Creates the configured superadmin, if any.
pub async fn bootstrap<S: TaskStore>(state: &AppState<S>) -> anyhow::Result<()> {
    if let Some(admin) = &state.config.bootstrap_admin {
        services::accounts::bootstrap_superadmin(state, admin).await?;
    }
    Ok(())
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
