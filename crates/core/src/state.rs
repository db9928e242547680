// Poll State Machine
//
// draft -> active -> confirmed, or -> cancelled. Events start active.
// Confirmation is one-way; the guards below are pure and never suspend.
// The store applies the transition with a compare-and-swap so the first
// confirmation wins.

use crate::error::{PollError, Result};
use crate::event::{Event, EventStatus};
use crate::tally::SlotWithVotes;
use crate::traits::ConfirmOutcome;

/// Status every new event starts in
pub const INITIAL_STATUS: EventStatus = EventStatus::Active;

/// What a permitted confirm request should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmDecision {
    /// Perform the transition
    Apply,
    /// Already confirmed with this slot; nothing to write
    Unchanged,
}

/// Guard for `confirm_slot`
///
/// `target` must be the tally of a slot that belongs to `event`.
pub fn check_confirm(event: &Event, actor_id: &str, target: &SlotWithVotes) -> Result<ConfirmDecision> {
    if !event.is_organizer(actor_id) {
        return Err(PollError::unauthorized(
            "Only the organizer can confirm a time slot",
        ));
    }

    match event.status {
        EventStatus::Confirmed => {
            if event.confirmed_slot_id.as_deref() == Some(target.id()) {
                Ok(ConfirmDecision::Unchanged)
            } else {
                Err(PollError::closed(format!(
                    "Event {} is already confirmed",
                    event.id
                )))
            }
        }
        EventStatus::Cancelled => Err(PollError::closed(format!(
            "Event {} is cancelled",
            event.id
        ))),
        EventStatus::Draft | EventStatus::Active => {
            if target.yes_count == 0 {
                Err(PollError::validation(
                    "Cannot confirm a time slot without any yes votes",
                ))
            } else {
                Ok(ConfirmDecision::Apply)
            }
        }
    }
}

/// Interpret the store's compare-and-swap result
pub fn settle_confirm(event_id: &str, slot_id: &str, outcome: ConfirmOutcome) -> Result<Event> {
    match outcome {
        ConfirmOutcome::Confirmed(event) => Ok(event),
        ConfirmOutcome::AlreadyConfirmed(event)
            if event.confirmed_slot_id.as_deref() == Some(slot_id) =>
        {
            Ok(event)
        }
        ConfirmOutcome::AlreadyConfirmed(event) => Err(PollError::closed(format!(
            "Event {} was confirmed with another slot",
            event.id
        ))),
        ConfirmOutcome::Missing => Err(PollError::event_not_found(event_id)),
    }
}

/// Guard for `upsert_vote`
pub fn check_accepts_votes(event: &Event) -> Result<()> {
    if event.status.accepts_votes() {
        Ok(())
    } else {
        Err(PollError::closed(format!(
            "Event {} is {} and no longer accepts votes",
            event.id, event.status
        )))
    }
}
