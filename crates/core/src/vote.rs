// Vote domain types
//
// A vote is one voter's availability stance on one slot. At most one vote
// exists per (slot_id, user_id) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Availability stance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Yes,
    Maybe,
    No,
}

impl Availability {
    /// Display order used by poll views
    pub const ALL: [Availability; 3] = [Availability::Yes, Availability::Maybe, Availability::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Yes => "yes",
            Availability::Maybe => "maybe",
            Availability::No => "no",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Availability::Yes),
            "maybe" => Ok(Availability::Maybe),
            "no" => Ok(Availability::No),
            other => Err(format!("unknown availability: {other}")),
        }
    }
}

/// Stored vote record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Vote {
    pub id: String,
    pub event_id: String,
    pub slot_id: String,
    pub user_id: String,
    /// Display label; may change between votes without an identity change
    pub user_name: String,
    pub availability: Availability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A voter's intent to record availability on one slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct VoteIntent {
    pub slot_id: String,
    pub availability: Availability,
}

/// Write request handed to the store's atomic upsert
///
/// `id` and `now` are only used when no vote exists yet for the pair;
/// on update the store keeps the existing id and created_at.
#[derive(Debug, Clone)]
pub struct VoteUpsert {
    pub id: String,
    pub event_id: String,
    pub slot_id: String,
    pub user_id: String,
    pub user_name: String,
    pub availability: Availability,
    pub now: DateTime<Utc>,
}

impl VoteUpsert {
    /// Vote record to insert when the pair has no vote yet
    pub fn into_new_vote(self) -> Vote {
        Vote {
            id: self.id,
            event_id: self.event_id,
            slot_id: self.slot_id,
            user_id: self.user_id,
            user_name: self.user_name,
            availability: self.availability,
            created_at: self.now,
            updated_at: self.now,
        }
    }

    /// Overwrite an existing vote in place, preserving id and created_at
    pub fn apply_to(&self, existing: &mut Vote) {
        existing.availability = self.availability;
        existing.user_name = self.user_name.clone();
        existing.updated_at = self.now;
    }
}
