// Core traits for pluggable persistence backends
//
// These traits allow the poll engine to be used with different backends:
// - In-memory implementations for dev mode and testing
// - Database implementations for production
//
// Invariants that span clients (vote uniqueness per (slot_id, user_id), no
// vote after confirmation, first confirmation wins) are enforced by the
// store, not by in-process locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::event::Event;
use crate::time_slot::TimeSlot;
use crate::vote::{Vote, VoteUpsert};

// ============================================================================
// EventStore - Event records
// ============================================================================

/// Outcome of the compare-and-swap confirm transition
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// This call performed the transition
    Confirmed(Event),
    /// Event was already confirmed; returned as currently stored
    AlreadyConfirmed(Event),
    /// No event with that id
    Missing,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event; fails if the id is already taken
    async fn create_event(&self, event: Event) -> Result<Event>;

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>>;

    /// Events owned by an organizer, newest first
    async fn list_events_by_organizer(&self, organizer_id: &str) -> Result<Vec<Event>>;

    /// Set status = confirmed and confirmed_slot_id only if the event is not
    /// yet confirmed
    async fn confirm_event(
        &self,
        event_id: &str,
        slot_id: &str,
        at: DateTime<Utc>,
    ) -> Result<ConfirmOutcome>;
}

// ============================================================================
// TimeSlotStore - Candidate slots
// ============================================================================

#[async_trait]
pub trait TimeSlotStore: Send + Sync {
    /// Insert a batch of slots; all or nothing
    async fn create_slots(&self, slots: Vec<TimeSlot>) -> Result<Vec<TimeSlot>>;

    /// Slots of an event ordered by date ascending, creation order within a date
    async fn list_slots(&self, event_id: &str) -> Result<Vec<TimeSlot>>;

    async fn get_slot(&self, event_id: &str, slot_id: &str) -> Result<Option<TimeSlot>>;
}

// ============================================================================
// VoteStore - Votes, unique per (slot_id, user_id)
// ============================================================================

#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Atomically insert or overwrite the vote for (slot_id, user_id)
    ///
    /// The event's status is checked in the same atomic step as the write:
    /// `NotFound` when the event is gone, `PollClosed` once it no longer
    /// accepts votes.
    async fn upsert_vote(&self, upsert: VoteUpsert) -> Result<Vote>;

    /// All votes of an event in arrival order
    async fn list_votes(&self, event_id: &str) -> Result<Vec<Vote>>;
}

// ============================================================================
// PollStore - Everything the engine needs from one backend
// ============================================================================

pub trait PollStore: EventStore + TimeSlotStore + VoteStore {}

impl<T> PollStore for T where T: EventStore + TimeSlotStore + VoteStore {}

/// Shared handle to a poll store
pub type SharedPollStore = Arc<dyn PollStore>;
