//! Application state.

use std::sync::Arc;

use auth::{JwtManager, PasswordHasher, RevokedTokens};
use task_store::TaskStore;

use crate::config::Config;

/// Shared application state.
pub struct AppState<S: TaskStore> {
    /// Server configuration.
    pub config: Config,
    /// Identity, profile and task store.
    pub store: S,
    /// Access token issuer and validator.
    pub jwt_manager: JwtManager,
    /// Token IDs revoked by logout.
    pub revoked_tokens: RevokedTokens,
    /// Password hashing costs.
    pub hasher: PasswordHasher,
}

impl<S: TaskStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, jwt_manager: JwtManager) -> Self {
        let hasher = PasswordHasher::new(config.password_memory_kib, config.password_iterations);
        Self {
            config,
            store,
            jwt_manager,
            revoked_tokens: RevokedTokens::new(),
            hasher,
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config and store.
pub fn create_shared_state<S: TaskStore>(
    config: Config,
    store: S,
    jwt_manager: JwtManager,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, jwt_manager))
}
