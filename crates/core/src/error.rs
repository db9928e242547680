// Error types for the poll engine

use thiserror::Error;

use crate::event::Event;

/// Result type alias for poll engine operations
pub type Result<T> = std::result::Result<T, PollError>;

/// Errors that can occur in poll engine operations
#[derive(Debug, Error)]
pub enum PollError {
    /// Referenced event or slot does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before any write
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Caller is not allowed to perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Event no longer accepts the requested change
    #[error("Poll closed: {0}")]
    PollClosed(String),

    /// Persistence collaborator call failed
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Event row was written but its slots were not
    #[error("Event {} created but its slots were not: {source}", event.id)]
    PartialCreation {
        event: Box<Event>,
        #[source]
        source: Box<PollError>,
    },
}

impl PollError {
    /// Create an event not found error
    pub fn event_not_found(id: impl Into<String>) -> Self {
        PollError::NotFound {
            entity: "Event",
            id: id.into(),
        }
    }

    /// Create a slot not found error
    pub fn slot_not_found(id: impl Into<String>) -> Self {
        PollError::NotFound {
            entity: "Slot",
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        PollError::ValidationFailed(msg.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        PollError::Unauthorized(msg.into())
    }

    /// Create a poll closed error
    pub fn closed(msg: impl Into<String>) -> Self {
        PollError::PollClosed(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl std::fmt::Display) -> Self {
        PollError::Persistence(msg.to_string())
    }
}

impl From<anyhow::Error> for PollError {
    fn from(err: anyhow::Error) -> Self {
        PollError::Persistence(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for PollError {
    fn from(err: serde_json::Error) -> Self {
        PollError::Persistence(err.to_string())
    }
}
