//! Server configuration.

use std::env;

use auth::{
    DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_PASSWORD_ITERATIONS, DEFAULT_PASSWORD_MEMORY_KIB,
};

/// Credentials for the superadmin created at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL; `None` keeps everything in memory.
    pub database_url: Option<String>,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Whether self-registration may pick a role.
    pub allow_registration_role: bool,
    /// Argon2 memory cost in KiB for new password hashes.
    pub password_memory_kib: u32,
    /// Argon2 time cost for new password hashes.
    pub password_iterations: u32,
    /// Superadmin to create at startup, if any.
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Log level.
    pub log_level: String,
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = non_empty("TASKBOARD_JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("TASKBOARD_JWT_SECRET is required"))?;

        let database_url = non_empty("DATABASE_URL");
        if let Some(url) = &database_url {
            if !url.starts_with("sqlite:") {
                anyhow::bail!("DATABASE_URL must be a sqlite: URL");
            }
        }

        let bootstrap_admin = match (
            non_empty("TASKBOARD_SUPERADMIN_USERNAME"),
            non_empty("TASKBOARD_SUPERADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin {
                username,
                email: env::var("TASKBOARD_SUPERADMIN_EMAIL").unwrap_or_default(),
                password,
            }),
            _ => None,
        };

        Ok(Self {
            host: env::var("TASKBOARD_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("TASKBOARD_SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            database_url,
            jwt_secret,
            jwt_expiration_hours: env::var("TASKBOARD_JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            allow_registration_role: flag("TASKBOARD_ALLOW_REGISTRATION_ROLE"),
            password_memory_kib: env::var("TASKBOARD_PASSWORD_MEMORY_KIB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PASSWORD_MEMORY_KIB),
            password_iterations: env::var("TASKBOARD_PASSWORD_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PASSWORD_ITERATIONS),
            bootstrap_admin,
            log_level: env::var("TASKBOARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration for tests and embedding: in-memory store, cheap hashing.
    pub fn for_testing(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            allow_registration_role: false,
            password_memory_kib: 8,
            password_iterations: 1,
            bootstrap_admin: None,
            log_level: "debug".to_string(),
        }
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
