// In-memory implementations for dev mode and testing
//
// InMemoryPollStore keeps all data in memory behind a single lock, so the
// status check and write of a vote upsert and the confirm compare-and-swap
// are atomic with respect to every other writer in the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{PollError, Result};
use crate::event::{Event, EventStatus};
use crate::state;
use crate::time_slot::TimeSlot;
use crate::traits::{ConfirmOutcome, EventStore, TimeSlotStore, VoteStore};
use crate::vote::{Vote, VoteUpsert};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<String, Event>,
    // Slots per event in creation order
    slots: HashMap<String, Vec<TimeSlot>>,
    // Votes in arrival order
    votes: Vec<Vote>,
    // (slot_id, user_id) -> index into votes
    vote_index: HashMap<(String, String), usize>,
}

/// In-memory poll store
///
/// All data is stored in memory and lost on restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPollStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored votes (useful for testing uniqueness)
    pub async fn vote_count(&self) -> usize {
        self.tables.read().await.votes.len()
    }
}

#[async_trait]
impl EventStore for InMemoryPollStore {
    async fn create_event(&self, event: Event) -> Result<Event> {
        let mut tables = self.tables.write().await;
        if tables.events.contains_key(&event.id) {
            return Err(PollError::persistence(format!(
                "duplicate event id: {}",
                event.id
            )));
        }
        tables.events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        Ok(self.tables.read().await.events.get(event_id).cloned())
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> Result<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut result: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.organizer_id == organizer_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn confirm_event(
        &self,
        event_id: &str,
        slot_id: &str,
        at: DateTime<Utc>,
    ) -> Result<ConfirmOutcome> {
        let mut tables = self.tables.write().await;
        let Some(event) = tables.events.get_mut(event_id) else {
            return Ok(ConfirmOutcome::Missing);
        };
        if event.status == EventStatus::Confirmed {
            return Ok(ConfirmOutcome::AlreadyConfirmed(event.clone()));
        }
        event.status = EventStatus::Confirmed;
        event.confirmed_slot_id = Some(slot_id.to_string());
        event.updated_at = at;
        Ok(ConfirmOutcome::Confirmed(event.clone()))
    }
}

#[async_trait]
impl TimeSlotStore for InMemoryPollStore {
    async fn create_slots(&self, slots: Vec<TimeSlot>) -> Result<Vec<TimeSlot>> {
        let mut tables = self.tables.write().await;
        for slot in &slots {
            let taken = tables
                .slots
                .get(&slot.event_id)
                .is_some_and(|existing| existing.iter().any(|s| s.id == slot.id));
            if taken {
                return Err(PollError::persistence(format!(
                    "duplicate slot id: {}",
                    slot.id
                )));
            }
        }
        for slot in &slots {
            tables
                .slots
                .entry(slot.event_id.clone())
                .or_default()
                .push(slot.clone());
        }
        Ok(slots)
    }

    async fn list_slots(&self, event_id: &str) -> Result<Vec<TimeSlot>> {
        let mut slots = self
            .tables
            .read()
            .await
            .slots
            .get(event_id)
            .cloned()
            .unwrap_or_default();
        // Stable sort keeps creation order within a date
        slots.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(slots)
    }

    async fn get_slot(&self, event_id: &str, slot_id: &str) -> Result<Option<TimeSlot>> {
        Ok(self
            .tables
            .read()
            .await
            .slots
            .get(event_id)
            .and_then(|slots| slots.iter().find(|s| s.id == slot_id))
            .cloned())
    }
}

#[async_trait]
impl VoteStore for InMemoryPollStore {
    async fn upsert_vote(&self, upsert: VoteUpsert) -> Result<Vote> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .get(&upsert.event_id)
            .ok_or_else(|| PollError::event_not_found(&upsert.event_id))?;
        state::check_accepts_votes(event)?;

        let key = (upsert.slot_id.clone(), upsert.user_id.clone());
        if let Some(&idx) = tables.vote_index.get(&key) {
            let existing = &mut tables.votes[idx];
            upsert.apply_to(existing);
            return Ok(existing.clone());
        }
        let vote = upsert.into_new_vote();
        let idx = tables.votes.len();
        tables.votes.push(vote.clone());
        tables.vote_index.insert(key, idx);
        Ok(vote)
    }

    async fn list_votes(&self, event_id: &str) -> Result<Vec<Vote>> {
        Ok(self
            .tables
            .read()
            .await
            .votes
            .iter()
            .filter(|v| v.event_id == event_id)
            .cloned()
            .collect())
    }
}
