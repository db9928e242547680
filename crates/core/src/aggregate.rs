// Event Aggregate
//
// The single read path for both the organizer dashboard and the public poll
// view: event metadata, slots and votes fetched concurrently, joined by
// slot_id and tallied.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::Result;
use crate::event::Event;
use crate::tally::{self, SlotWithVotes};
use crate::traits::SharedPollStore;

/// Composed read view of one event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventAggregate {
    pub event: Event,
    pub slots: Vec<SlotWithVotes>,
    /// Best option, only when it has at least one yes vote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_slot_id: Option<String>,
}

impl EventAggregate {
    pub fn new(event: Event, slots: Vec<SlotWithVotes>) -> Self {
        let best_slot_id = tally::best_option(&slots).map(|s| s.id().to_string());
        Self {
            event,
            slots,
            best_slot_id,
        }
    }

    pub fn slot(&self, slot_id: &str) -> Option<&SlotWithVotes> {
        self.slots.iter().find(|s| s.id() == slot_id)
    }

    pub fn best_option(&self) -> Option<&SlotWithVotes> {
        self.best_slot_id.as_deref().and_then(|id| self.slot(id))
    }

    pub fn confirmed_slot(&self) -> Option<&SlotWithVotes> {
        self.event
            .confirmed_slot_id
            .as_deref()
            .and_then(|id| self.slot(id))
    }
}

pub struct AggregateLoader {
    store: SharedPollStore,
}

impl AggregateLoader {
    pub fn new(store: SharedPollStore) -> Self {
        Self { store }
    }

    /// `None` when the event does not exist; never a partial aggregate
    pub async fn load(&self, event_id: &str) -> Result<Option<EventAggregate>> {
        let (event, slots, votes) = tokio::try_join!(
            self.store.get_event(event_id),
            self.store.list_slots(event_id),
            self.store.list_votes(event_id),
        )?;

        let Some(event) = event else {
            return Ok(None);
        };

        Ok(Some(EventAggregate::new(event, tally::tally_all(slots, &votes))))
    }
}
