//! Storage for Taskboard identities, profiles and tasks.
//!
//! [`TaskStore`] is implemented by [`MemoryTaskStore`] (the default, also
//! used in tests) and [`SqliteTaskStore`] (durable, single process).

#[cfg(test)]
mod conformance;
mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
