//! HTTP API protocol definitions for the Taskboard server and its clients.
//!
//! Request payloads keep loosely typed fields (strings, options) so the server
//! can report every problem as a field error instead of rejecting the body.

mod error;
mod requests;
mod responses;
mod types;

pub use error::*;
pub use requests::*;
pub use responses::*;
pub use types::*;
