// HTTP API routes
//
// Each submodule handles one data channel with its own AppState.

pub mod common;
pub mod events;
pub mod public;

// Re-export common types
pub use common::{ErrorResponse, ListResponse};
