// Postgres storage layer with sqlx
//
// This crate provides database implementations for core traits:
// - DbPollStore: implements EventStore, TimeSlotStore and VoteStore

pub mod models;
pub mod poll_store;
pub mod repositories;

pub use models::*;
pub use poll_store::DbPollStore;
pub use repositories::*;
