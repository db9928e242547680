// Database-backed poll store
//
// Implements the core EventStore, TimeSlotStore and VoteStore traits on top
// of the repository layer. Row models are converted to domain types here;
// any sqlx failure surfaces as PollError::Persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherpoll_core::traits::{ConfirmOutcome, EventStore, TimeSlotStore, VoteStore};
use gatherpoll_core::{Event, PollError, Result, TimeSlot, Vote, VoteUpsert};

use crate::models::{CreateEventRow, CreateTimeSlotRow, UpsertVoteRow};
use crate::repositories::Database;

/// Postgres implementation of the poll store traits
#[derive(Clone)]
pub struct DbPollStore {
    db: Database,
}

impl DbPollStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for DbPollStore {
    async fn create_event(&self, event: Event) -> Result<Event> {
        let row = self.db.create_event(CreateEventRow::from(&event)).await?;
        Ok(row.into())
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        Ok(self.db.get_event(event_id).await?.map(Event::from))
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> Result<Vec<Event>> {
        let rows = self.db.list_events_by_organizer(organizer_id).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn confirm_event(
        &self,
        event_id: &str,
        slot_id: &str,
        at: DateTime<Utc>,
    ) -> Result<ConfirmOutcome> {
        if let Some(row) = self.db.confirm_event(event_id, slot_id, at).await? {
            return Ok(ConfirmOutcome::Confirmed(row.into()));
        }

        // Lost the race or never existed; report what is stored now
        tracing::debug!(event_id = %event_id, slot_id = %slot_id, "Conditional confirm matched no row");
        match self.db.get_event(event_id).await? {
            Some(row) => Ok(ConfirmOutcome::AlreadyConfirmed(row.into())),
            None => Ok(ConfirmOutcome::Missing),
        }
    }
}

#[async_trait]
impl TimeSlotStore for DbPollStore {
    async fn create_slots(&self, slots: Vec<TimeSlot>) -> Result<Vec<TimeSlot>> {
        let inputs = slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                let position = i32::try_from(position)
                    .map_err(|_| PollError::validation("Too many time slots in one batch"))?;
                Ok(CreateTimeSlotRow {
                    id: slot.id,
                    event_id: slot.event_id,
                    date: slot.date,
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    position,
                    created_at: slot.created_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = self.db.create_time_slots(inputs).await?;
        Ok(rows.into_iter().map(TimeSlot::from).collect())
    }

    async fn list_slots(&self, event_id: &str) -> Result<Vec<TimeSlot>> {
        let rows = self.db.list_time_slots(event_id).await?;
        Ok(rows.into_iter().map(TimeSlot::from).collect())
    }

    async fn get_slot(&self, event_id: &str, slot_id: &str) -> Result<Option<TimeSlot>> {
        Ok(self
            .db
            .get_time_slot(event_id, slot_id)
            .await?
            .map(TimeSlot::from))
    }
}

#[async_trait]
impl VoteStore for DbPollStore {
    async fn upsert_vote(&self, upsert: VoteUpsert) -> Result<Vote> {
        let event_id = upsert.event_id.clone();
        let row = self
            .db
            .upsert_vote(UpsertVoteRow {
                id: upsert.id,
                event_id: upsert.event_id,
                slot_id: upsert.slot_id,
                user_id: upsert.user_id,
                user_name: upsert.user_name,
                availability: upsert.availability.to_string(),
                now: upsert.now,
            })
            .await?;

        match row {
            Some(row) => Vote::try_from(row),
            None => {
                tracing::debug!(event_id = %event_id, "Conditional vote upsert matched no open event");
                let event = EventStore::get_event(self, &event_id)
                    .await?
                    .ok_or_else(|| PollError::event_not_found(&event_id))?;
                Err(PollError::closed(format!(
                    "Event {} is {} and no longer accepts votes",
                    event.id, event.status
                )))
            }
        }
    }

    async fn list_votes(&self, event_id: &str) -> Result<Vec<Vote>> {
        self.db
            .list_votes(event_id)
            .await?
            .into_iter()
            .map(Vote::try_from)
            .collect()
    }
}
