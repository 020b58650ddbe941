//! Idea Islands library
//!
//! Named text records ("islands") whose lines are ideas: a file-backed
//! store with legacy-format migration, random idea sampling, and
//! replication of edits to a peer service.

mod cli;
mod config;
mod errors;
mod helper;
mod island;
mod query;
pub mod sampling;
mod storage;
mod store;
mod sync;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use island::*;
pub use query::*;
pub use storage::*;
pub use store::*;
pub use sync::*;
pub use types::*;
