//! Vidhi Common - shared types for the compliance QA daemon.
//!
//! Plain serde types consumed by vidhid and by outer surfaces (API, log
//! shippers) that live outside this workspace.

pub mod audit;
pub mod error;
pub mod query;
pub mod stats;

pub use audit::*;
pub use error::*;
pub use query::*;
pub use stats::*;
