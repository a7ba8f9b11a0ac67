//! Authentication and authorization for Taskboard.
//!
//! This crate provides:
//! - The authorization engine deciding what an actor may see and change
//! - Salted password hashing and password strength rules
//! - JWT access token generation, validation and revocation

mod actor;
mod error;
mod jwt;
mod password;
pub mod policy;
mod revocation;

pub use actor::*;
pub use error::*;
pub use jwt::*;
pub use password::*;
pub use policy::{DashboardScope, Decision, Denial};
pub use revocation::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "taskboard";
