// Tally Engine
//
// Derives per-slot vote counts from the stored votes. Always recomputed from
// the full vote list; never patched incrementally.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::time_slot::TimeSlot;
use crate::vote::{Availability, Vote};

/// A slot joined with its votes and derived counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotWithVotes {
    #[serde(flatten)]
    pub slot: TimeSlot,
    /// Votes in arrival order
    pub votes: Vec<Vote>,
    pub yes_count: usize,
    pub maybe_count: usize,
    pub no_count: usize,
    pub total_votes: usize,
}

impl SlotWithVotes {
    pub fn id(&self) -> &str {
        &self.slot.id
    }

    pub fn count(&self, availability: Availability) -> usize {
        match availability {
            Availability::Yes => self.yes_count,
            Availability::Maybe => self.maybe_count,
            Availability::No => self.no_count,
        }
    }

    /// Fraction of the total held by one availability; 0.0 with no votes
    pub fn share_of(&self, availability: Availability) -> f64 {
        if self.total_votes == 0 {
            return 0.0;
        }
        self.count(availability) as f64 / self.total_votes as f64
    }

    /// The given voter's current vote on this slot
    pub fn vote_for(&self, user_id: &str) -> Option<&Vote> {
        self.votes.iter().find(|v| v.user_id == user_id)
    }
}

/// Join a slot with the votes cast on it and count them
///
/// Votes for other slots are ignored, so callers may pass the whole event's
/// vote list.
pub fn tally(slot: TimeSlot, votes: &[Vote]) -> SlotWithVotes {
    let votes: Vec<Vote> = votes
        .iter()
        .filter(|v| v.slot_id == slot.id)
        .cloned()
        .collect();

    let (mut yes_count, mut maybe_count, mut no_count) = (0, 0, 0);
    for vote in &votes {
        match vote.availability {
            Availability::Yes => yes_count += 1,
            Availability::Maybe => maybe_count += 1,
            Availability::No => no_count += 1,
        }
    }

    SlotWithVotes {
        slot,
        votes,
        yes_count,
        maybe_count,
        no_count,
        total_votes: yes_count + maybe_count + no_count,
    }
}

/// Tally every slot, preserving slot order
pub fn tally_all(slots: Vec<TimeSlot>, votes: &[Vote]) -> Vec<SlotWithVotes> {
    slots.into_iter().map(|slot| tally(slot, votes)).collect()
}

/// Slot with the highest yes count; ties go to the earliest slot
///
/// Returns a slot even when every yes count is zero. Use [`best_option`] to
/// decide whether anything should be presented as the best option.
pub fn select_best_slot(slots: &[SlotWithVotes]) -> Option<&SlotWithVotes> {
    slots.iter().fold(None, |best, current| match best {
        Some(b) if current.yes_count <= b.yes_count => Some(b),
        _ => Some(current),
    })
}

/// Best slot only if it has at least one yes vote
pub fn best_option(slots: &[SlotWithVotes]) -> Option<&SlotWithVotes> {
    select_best_slot(slots).filter(|s| s.yes_count > 0)
}
