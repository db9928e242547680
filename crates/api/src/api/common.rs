// Common DTOs for public API
//
// These types are shared across the organizer and public endpoints.

use axum::http::StatusCode;
use axum::Json;
use gatherpoll_core::{Event, PollError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
    /// Event that was created before a later step failed; retry its slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            event: None,
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a poll engine error
pub fn status_for(err: &PollError) -> StatusCode {
    match err {
        PollError::NotFound { .. } => StatusCode::NOT_FOUND,
        PollError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PollError::Unauthorized(_) => StatusCode::FORBIDDEN,
        PollError::PollClosed(_) => StatusCode::CONFLICT,
        PollError::PartialCreation { .. } => StatusCode::BAD_GATEWAY,
        PollError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a poll engine error to a response, logging server-side failures
pub fn poll_error(context: &str, err: PollError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("{}: {}", context, err);
    } else {
        tracing::debug!("{}: {}", context, err);
    }

    let body = match err {
        PollError::PartialCreation { event, source } => ErrorResponse {
            error: format!(
                "Event created but its time slots were not: {}",
                client_message(&source)
            ),
            event: Some(*event),
        },
        other => ErrorResponse::new(client_message(&other)),
    };
    body.into_response(status)
}

/// Error text safe to return; persistence details stay in the server log
fn client_message(err: &PollError) -> String {
    match err {
        PollError::Persistence(_) => "Internal server error".to_string(),
        other => other.to_string(),
    }
}

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}
