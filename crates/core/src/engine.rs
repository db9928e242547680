// Poll Engine
//
// Facade exposing the complete public surface of the core:
// create_event, create_slots, load_aggregate, upsert_vote, confirm_slot and
// resolve_identity, plus the organizer dashboard reads.
//
// Control flow: identity -> VoteLedger::upsert_vote -> (caller refreshes)
// load_aggregate re-tallies -> confirm_slot on organizer action.

use chrono::Utc;

use crate::aggregate::{AggregateLoader, EventAggregate};
use crate::client::{Channel, PollClient};
use crate::error::{PollError, Result};
use crate::event::{DashboardSummary, Event, NewEvent};
use crate::identity::{AuthenticatedUser, IdentityProvider, Resolution, VoterIdentity};
use crate::ledger::VoteLedger;
use crate::slots::SlotService;
use crate::state::{self, ConfirmDecision};
use crate::time_slot::{SlotCandidate, TimeSlot};
use crate::vote::{Vote, VoteIntent};

pub struct PollEngine {
    client: PollClient,
    slots: SlotService,
    ledger: VoteLedger,
    aggregates: AggregateLoader,
}

impl PollEngine {
    pub fn new(client: PollClient) -> Self {
        let store = client.store().clone();
        Self {
            slots: SlotService::new(store.clone()),
            ledger: VoteLedger::new(store.clone()),
            aggregates: AggregateLoader::new(store),
            client,
        }
    }

    pub fn channel(&self) -> Channel {
        self.client.channel()
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, organizer: &AuthenticatedUser, input: NewEvent) -> Result<Event> {
        self.client.require_authenticated("create_event")?;
        let event = Self::build_event(organizer, input)?;
        let event = self.client.store().create_event(event).await?;
        tracing::info!(
            event_id = %event.id,
            organizer_id = %event.organizer_id,
            "Created event"
        );
        Ok(event)
    }

    /// Create an event and its slots as two explicit phases
    ///
    /// Everything is validated before the first write. If the slot write
    /// fails after the event write, the error is `PartialCreation` carrying
    /// the created event so the caller can retry `create_slots` alone.
    pub async fn create_event_with_slots(
        &self,
        organizer: &AuthenticatedUser,
        input: NewEvent,
        candidates: &[SlotCandidate],
    ) -> Result<(Event, Vec<TimeSlot>)> {
        self.client.require_authenticated("create_event")?;
        let event = Self::build_event(organizer, input)?;
        SlotService::validate(candidates)?;

        let event = self.client.store().create_event(event).await?;
        match self.slots.create_slots(&event.id, candidates).await {
            Ok(slots) => {
                tracing::info!(
                    event_id = %event.id,
                    organizer_id = %event.organizer_id,
                    slot_count = slots.len(),
                    "Created event with slots"
                );
                Ok((event, slots))
            }
            Err(source) => {
                tracing::warn!(
                    event_id = %event.id,
                    error = %source,
                    "Event created but slot creation failed"
                );
                Err(PollError::PartialCreation {
                    event: Box::new(event),
                    source: Box::new(source),
                })
            }
        }
    }

    pub async fn create_slots(
        &self,
        organizer: &AuthenticatedUser,
        event_id: &str,
        candidates: &[SlotCandidate],
    ) -> Result<Vec<TimeSlot>> {
        self.client.require_authenticated("create_slots")?;
        SlotService::validate(candidates)?;

        let event = self.require_event(event_id).await?;
        if !event.is_organizer(&organizer.id) {
            return Err(PollError::unauthorized(
                "Only the organizer can add time slots",
            ));
        }

        let slots = self.slots.create_slots(event_id, candidates).await?;
        tracing::info!(event_id = %event_id, slot_count = slots.len(), "Created time slots");
        Ok(slots)
    }

    /// Organizer's events, newest first
    pub async fn list_organizer_events(&self, organizer: &AuthenticatedUser) -> Result<Vec<Event>> {
        self.client.require_authenticated("list_organizer_events")?;
        self.client
            .store()
            .list_events_by_organizer(&organizer.id)
            .await
    }

    pub async fn dashboard_summary(&self, organizer: &AuthenticatedUser) -> Result<DashboardSummary> {
        let events = self.list_organizer_events(organizer).await?;
        Ok(DashboardSummary::from_events(&events))
    }

    // ============================================
    // Reads
    // ============================================

    pub async fn load_aggregate(&self, event_id: &str) -> Result<Option<EventAggregate>> {
        self.aggregates.load(event_id).await
    }

    /// Existence check that skips loading slots and votes
    pub async fn event_exists(&self, event_id: &str) -> Result<bool> {
        Ok(self.client.store().get_event(event_id).await?.is_some())
    }

    // ============================================
    // Votes
    // ============================================

    pub async fn upsert_vote(
        &self,
        event_id: &str,
        voter: &VoterIdentity,
        intent: VoteIntent,
    ) -> Result<Vote> {
        self.client.check_voter(voter)?;
        let availability = intent.availability;
        let vote = self.ledger.upsert_vote(event_id, voter, intent).await?;
        tracing::debug!(
            event_id = %event_id,
            slot_id = %vote.slot_id,
            user_id = %vote.user_id,
            availability = %availability,
            channel = %self.client.channel(),
            "Recorded vote"
        );
        Ok(vote)
    }

    // ============================================
    // Confirmation
    // ============================================

    pub async fn confirm_slot(
        &self,
        actor: &AuthenticatedUser,
        event_id: &str,
        slot_id: &str,
    ) -> Result<Event> {
        self.client.require_authenticated("confirm_slot")?;

        let aggregate = self
            .load_aggregate(event_id)
            .await?
            .ok_or_else(|| PollError::event_not_found(event_id))?;
        let target = aggregate
            .slot(slot_id)
            .ok_or_else(|| PollError::slot_not_found(slot_id))?;

        let yes_count = target.yes_count;
        let decision = state::check_confirm(&aggregate.event, &actor.id, target).inspect_err(|e| {
            tracing::warn!(event_id = %event_id, slot_id = %slot_id, error = %e, "Confirm rejected");
        })?;
        if decision == ConfirmDecision::Unchanged {
            return Ok(aggregate.event);
        }

        let outcome = self
            .client
            .store()
            .confirm_event(event_id, slot_id, Utc::now())
            .await?;
        let event = state::settle_confirm(event_id, slot_id, outcome)?;
        tracing::info!(
            event_id = %event_id,
            slot_id = %slot_id,
            yes_count,
            "Confirmed time slot"
        );
        Ok(event)
    }

    // ============================================
    // Identity
    // ============================================

    pub async fn resolve_identity(
        &self,
        provider: &dyn IdentityProvider,
        event_id: &str,
    ) -> Result<Resolution> {
        provider.resolve(event_id).await
    }

    async fn require_event(&self, event_id: &str) -> Result<Event> {
        self.client
            .store()
            .get_event(event_id)
            .await?
            .ok_or_else(|| PollError::event_not_found(event_id))
    }

    fn build_event(organizer: &AuthenticatedUser, input: NewEvent) -> Result<Event> {
        let id = input.id.trim();
        let title = input.title.trim();
        if id.is_empty() {
            return Err(PollError::validation("Event id is required"));
        }
        if title.is_empty() {
            return Err(PollError::validation("Event title is required"));
        }
        if organizer.id.trim().is_empty() {
            return Err(PollError::unauthorized("Organizer identity is required"));
        }

        let now = Utc::now();
        Ok(Event {
            id: id.to_string(),
            title: title.to_string(),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            organizer_id: organizer.id.clone(),
            organizer_name: organizer.label().to_string(),
            status: state::INITIAL_STATUS,
            confirmed_slot_id: None,
            created_at: now,
            updated_at: now,
        })
    }
}
