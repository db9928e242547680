// Database models (internal, may differ from core domain types)

use chrono::{DateTime, Utc};
use gatherpoll_core::{Availability, Event, EventStatus, PollError, TimeSlot, Vote};
use sqlx::FromRow;

// ============================================
// Events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub organizer_id: String,
    pub organizer_name: String,
    pub status: String,
    pub confirmed_slot_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateEventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub organizer_id: String,
    pub organizer_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            organizer_id: row.organizer_id,
            organizer_name: row.organizer_name,
            status: EventStatus::from(row.status.as_str()),
            confirmed_slot_id: row.confirmed_slot_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Event> for CreateEventRow {
    fn from(event: &Event) -> Self {
        CreateEventRow {
            id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            organizer_id: event.organizer_id.clone(),
            organizer_name: event.organizer_name.clone(),
            status: event.status.to_string(),
            created_at: event.created_at,
        }
    }
}

// ============================================
// Time slots
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct TimeSlotRow {
    pub id: String,
    pub event_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTimeSlotRow {
    pub id: String,
    pub event_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<TimeSlotRow> for TimeSlot {
    fn from(row: TimeSlotRow) -> Self {
        TimeSlot {
            id: row.id,
            event_id: row.event_id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            created_at: row.created_at,
        }
    }
}

// ============================================
// Votes
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct VoteRow {
    pub id: String,
    pub event_id: String,
    pub slot_id: String,
    pub user_id: String,
    pub user_name: String,
    pub availability: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertVoteRow {
    pub id: String,
    pub event_id: String,
    pub slot_id: String,
    pub user_id: String,
    pub user_name: String,
    pub availability: String,
    pub now: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = PollError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let availability: Availability = row
            .availability
            .parse()
            .map_err(|e: String| PollError::persistence(format!("vote {}: {e}", row.id)))?;
        Ok(Vote {
            id: row.id,
            event_id: row.event_id,
            slot_id: row.slot_id,
            user_id: row.user_id,
            user_name: row.user_name,
            availability,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
