// Data channel handles
// Decision: Authenticated and public access are two explicit handles passed
// to constructors, never process-wide singletons
//
// Both channels read and write the same underlying store with identical
// semantics; the channel only decides which operations are allowed.

use crate::error::{PollError, Result};
use crate::identity::{IdentityKind, VoterIdentity};
use crate::traits::SharedPollStore;

/// Which access channel a handle represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Requires a signed-in session (organizer/dashboard operations)
    Authenticated,
    /// Requires no session (public poll voting)
    Public,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Authenticated => write!(f, "authenticated"),
            Channel::Public => write!(f, "public"),
        }
    }
}

/// Configuration-bound handle to the persistence collaborator
#[derive(Clone)]
pub struct PollClient {
    channel: Channel,
    store: SharedPollStore,
}

impl PollClient {
    pub fn authenticated(store: SharedPollStore) -> Self {
        Self {
            channel: Channel::Authenticated,
            store,
        }
    }

    pub fn public(store: SharedPollStore) -> Self {
        Self {
            channel: Channel::Public,
            store,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn store(&self) -> &SharedPollStore {
        &self.store
    }

    /// Reject organizer-only operations on the public channel
    pub fn require_authenticated(&self, operation: &str) -> Result<()> {
        match self.channel {
            Channel::Authenticated => Ok(()),
            Channel::Public => Err(PollError::unauthorized(format!(
                "{operation} requires an authenticated session"
            ))),
        }
    }

    /// The public channel only writes under anonymous identities
    pub fn check_voter(&self, voter: &VoterIdentity) -> Result<()> {
        match (self.channel, voter.kind) {
            (Channel::Public, IdentityKind::Authenticated) => Err(PollError::unauthorized(
                "Authenticated identities vote through a signed-in session",
            )),
            _ => Ok(()),
        }
    }
}
