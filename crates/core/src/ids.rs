// Opaque id minting
// Decision: Prefixed UUID v7 strings (time-ordered, globally unique, never parsed)

use uuid::Uuid;

fn prefixed(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::now_v7().simple())
}

pub fn event_id() -> String {
    prefixed("evt")
}

pub fn slot_id() -> String {
    prefixed("slot")
}

pub fn vote_id() -> String {
    prefixed("vote")
}

/// Anonymous voter identity (`voter_<uniqueToken>`)
pub fn voter_id() -> String {
    prefixed("voter")
}

/// Whether an id is in the anonymous voter namespace
pub fn is_voter_id(id: &str) -> bool {
    id.strip_prefix("voter_").is_some_and(|token| !token.is_empty())
}
