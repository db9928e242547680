// TimeSlot domain types
//
// A candidate date/time range proposed by the organizer. Dates and times are
// kept as the literal strings the organizer supplied (no timezone handling).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Candidate time slot belonging to exactly one event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TimeSlot {
    pub id: String,
    pub event_id: String,
    /// Calendar date, e.g. "2026-11-02"
    pub date: String,
    /// Local wall-clock start, e.g. "18:00"
    pub start_time: String,
    /// Local wall-clock end, e.g. "21:00"
    pub end_time: String,
    pub created_at: DateTime<Utc>,
}

/// Organizer-supplied slot candidate, before an id is minted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotCandidate {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl SlotCandidate {
    pub fn new(
        date: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// All three fields are present (non-blank)
    pub fn is_complete(&self) -> bool {
        !self.date.trim().is_empty()
            && !self.start_time.trim().is_empty()
            && !self.end_time.trim().is_empty()
    }
}
