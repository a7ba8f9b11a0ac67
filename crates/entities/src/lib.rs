//! Core entity definitions for Taskboard.
//!
//! This crate defines the identity, profile and task records shared by the
//! authorization engine, the stores and the server, together with the task
//! lifecycle rules that every write path applies.

mod identity;
mod profile;
mod task;
mod validation;
mod visibility;

pub use identity::*;
pub use profile::*;
pub use task::*;
pub use validation::*;
pub use visibility::*;
