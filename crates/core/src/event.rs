// Event domain types
//
// These types represent the Event entity and its lifecycle status.
// Used by storage, engine and API crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Event lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Active,
    Confirmed,
    Cancelled,
}

impl EventStatus {
    /// Whether votes may still be recorded against the event
    pub fn accepts_votes(&self) -> bool {
        matches!(self, EventStatus::Draft | EventStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Active => "active",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventStatus {
    fn from(s: &str) -> Self {
        match s {
            "draft" => EventStatus::Draft,
            "confirmed" => EventStatus::Confirmed,
            "cancelled" => EventStatus::Cancelled,
            _ => EventStatus::Active,
        }
    }
}

/// Event - the gathering being scheduled
///
/// `confirmed_slot_id` is set if and only if `status` is `Confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organizer_id: String,
    pub organizer_name: String,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_slot_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_confirmed(&self) -> bool {
        self.status == EventStatus::Confirmed
    }

    pub fn is_organizer(&self, user_id: &str) -> bool {
        self.organizer_id == user_id
    }
}

/// Input for creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewEvent {
    /// Caller-supplied id; must be globally unique
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Per-organizer event counts shown on the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DashboardSummary {
    pub total: usize,
    pub active: usize,
    pub confirmed: usize,
}

impl DashboardSummary {
    pub fn from_events(events: &[Event]) -> Self {
        events.iter().fold(Self::default(), |mut acc, e| {
            acc.total += 1;
            match e.status {
                EventStatus::Active => acc.active += 1,
                EventStatus::Confirmed => acc.confirmed += 1,
                EventStatus::Draft | EventStatus::Cancelled => {}
            }
            acc
        })
    }
}
