// Vote Ledger
//
// Holds at most one vote per (slot_id, user_id). A repeated vote intent by
// the same voter on the same slot overwrites availability, user_name and
// updated_at in place. Uniqueness and the closed-poll guard are enforced by
// the store's atomic upsert; the reads here only produce precise errors
// early. Store errors propagate unchanged and are never retried here.

use chrono::Utc;

use crate::error::{PollError, Result};
use crate::identity::{IdentityKind, VoterIdentity};
use crate::ids;
use crate::state;
use crate::traits::SharedPollStore;
use crate::vote::{Vote, VoteIntent, VoteUpsert};

pub struct VoteLedger {
    store: SharedPollStore,
}

impl VoteLedger {
    pub fn new(store: SharedPollStore) -> Self {
        Self { store }
    }

    pub async fn upsert_vote(
        &self,
        event_id: &str,
        voter: &VoterIdentity,
        intent: VoteIntent,
    ) -> Result<Vote> {
        let user_id = voter.id.trim();
        let user_name = voter.name.trim();
        if user_id.is_empty() {
            return Err(PollError::validation("Voter id is required"));
        }
        if user_name.is_empty() {
            return Err(PollError::validation("Voter name is required"));
        }
        if voter.kind == IdentityKind::Anonymous {
            if voter.email.trim().is_empty() {
                return Err(PollError::validation("Voter email is required"));
            }
            if !ids::is_voter_id(user_id) {
                return Err(PollError::validation(
                    "Anonymous voter id must come from voter registration",
                ));
            }
        }

        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| PollError::event_not_found(event_id))?;
        state::check_accepts_votes(&event)?;

        if self.store.get_slot(event_id, &intent.slot_id).await?.is_none() {
            return Err(PollError::slot_not_found(&intent.slot_id));
        }

        let upsert = VoteUpsert {
            id: ids::vote_id(),
            event_id: event.id,
            slot_id: intent.slot_id,
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            availability: intent.availability,
            now: Utc::now(),
        };
        self.store.upsert_vote(upsert).await
    }
}
