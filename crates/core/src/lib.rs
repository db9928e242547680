// Availability Poll Engine
//
// This crate turns a stream of per-voter, per-slot votes into a ranked view
// of slot support and a safe, idempotent confirmation workflow.
//
// Key design decisions:
// - Uses traits (EventStore, TimeSlotStore, VoteStore) for pluggable backends
// - Vote uniqueness per (slot_id, user_id) and first-confirmation-wins are
//   enforced by the store (unique index / compare-and-swap), not by locks here
// - Tallies are recomputed from stored votes on every read
// - Voter identity is pluggable (verified session or device-local anonymous
//   profile); the ledger and tally never know which kind they have
// - Authenticated and public access are explicit PollClient handles

// Domain entity types
pub mod event;
pub mod time_slot;
pub mod vote;

pub mod aggregate;
pub mod client;
pub mod engine;
pub mod error;
pub mod identity;
pub mod ids;
pub mod ledger;
pub mod slots;
pub mod state;
pub mod tally;
pub mod traits;

// In-memory implementations for dev mode and testing
pub mod memory;

// Re-exports for convenience
pub use aggregate::{AggregateLoader, EventAggregate};
pub use client::{Channel, PollClient};
pub use engine::PollEngine;
pub use error::{PollError, Result};
pub use event::{DashboardSummary, Event, EventStatus, NewEvent};
pub use identity::{
    AnonymousIdentityProvider, AnonymousIdentityStorage, AnonymousVoter, AuthenticatedUser,
    FileIdentityStorage, IdentityKind, IdentityProvider, InMemoryIdentityStorage, Resolution,
    SessionIdentityProvider, VoterIdentity,
};
pub use ledger::VoteLedger;
pub use memory::InMemoryPollStore;
pub use slots::SlotService;
pub use tally::{best_option, select_best_slot, tally, SlotWithVotes};
pub use time_slot::{SlotCandidate, TimeSlot};
pub use traits::{ConfirmOutcome, EventStore, PollStore, SharedPollStore, TimeSlotStore, VoteStore};
pub use vote::{Availability, Vote, VoteIntent, VoteUpsert};
