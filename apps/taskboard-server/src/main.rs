//! Taskboard Server binary.

use std::net::SocketAddr;

use task_store::{MemoryTaskStore, SqliteTaskStore, TaskStore};
use taskboard_server::{bootstrap, config::Config, create_app, create_state, init_tracing};

async fn serve<S: TaskStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    // Create application state
    let state = create_state(config.clone(), store);
    bootstrap(&state).await?;

    // Create application router
    let app = create_app(state);

    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(addr = %addr, "Server listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    tracing::info!(
        allow_registration_role = config.allow_registration_role,
        persistent = config.database_url.is_some(),
        "Starting Taskboard Server"
    );

    match config.database_url.clone() {
        Some(url) => {
            let store = SqliteTaskStore::connect(&url).await?;
            tracing::info!(url = %url, "Using SQLite store");
            serve(config, store).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data is kept in memory");
            serve(config, MemoryTaskStore::new()).await
        }
    }
}
