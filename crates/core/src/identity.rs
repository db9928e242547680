// Identity Resolver
//
// Produces the stable voter identity every vote attaches to. Two providers:
// - SessionIdentityProvider: a verified sign-in session
// - AnonymousIdentityProvider: an unverified profile persisted on the device,
//   scoped to one event
//
// The Vote Ledger and Tally Engine only ever see a VoterIdentity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{PollError, Result};
use crate::ids;

/// How the identity was established
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Authenticated,
    Anonymous,
}

/// Identity a vote is recorded under
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct VoterIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub kind: IdentityKind,
}

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    /// Display label: display name, falling back to email
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    pub fn to_identity(&self) -> VoterIdentity {
        VoterIdentity {
            id: self.id.clone(),
            name: self.label().to_string(),
            email: self.email.clone(),
            kind: IdentityKind::Authenticated,
        }
    }
}

/// Result of resolving the voter for an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Identified(VoterIdentity),
    /// Caller must collect a name and email and register a new identity
    NeedsRegistration,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, event_id: &str) -> Result<Resolution>;
}

// ============================================================================
// SessionIdentityProvider - verified session
// ============================================================================

/// Identity backed by the external sign-in session
///
/// Sign-in state changes are published on a watch channel.
pub struct SessionIdentityProvider {
    current: watch::Sender<Option<AuthenticatedUser>>,
}

impl SessionIdentityProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    pub fn signed_in(user: AuthenticatedUser) -> Self {
        let provider = Self::new();
        provider.sign_in(user);
        provider
    }

    pub fn sign_in(&self, user: AuthenticatedUser) {
        tracing::debug!(user_id = %user.id, "Session signed in");
        self.current.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        tracing::debug!("Session signed out");
        self.current.send_replace(None);
    }

    pub fn current_user(&self) -> Option<AuthenticatedUser> {
        self.current.borrow().clone()
    }

    /// Receive a notification whenever sign-in state changes
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthenticatedUser>> {
        self.current.subscribe()
    }
}

impl Default for SessionIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentityProvider {
    async fn resolve(&self, _event_id: &str) -> Result<Resolution> {
        match self.current_user() {
            Some(user) => Ok(Resolution::Identified(user.to_identity())),
            None => Err(PollError::unauthorized("No signed-in user")),
        }
    }
}

// ============================================================================
// Anonymous identities
// ============================================================================

/// Serialized form kept in device-local storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AnonymousVoter {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl AnonymousVoter {
    pub fn to_identity(&self) -> VoterIdentity {
        VoterIdentity {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            kind: IdentityKind::Anonymous,
        }
    }
}

/// Validate registration input and mint a fresh anonymous voter
pub fn mint_anonymous(name: &str, email: &str) -> Result<AnonymousVoter> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
        return Err(PollError::validation("Voter name is required"));
    }
    if email.is_empty() {
        return Err(PollError::validation("Voter email is required"));
    }
    Ok(AnonymousVoter {
        id: ids::voter_id(),
        name: name.to_string(),
        email: email.to_string(),
    })
}

/// Storage key for an event's anonymous identity
pub fn storage_key(event_id: &str) -> String {
    format!("voter_{event_id}")
}

/// Device-local key/value storage for anonymous identities
#[async_trait]
pub trait AnonymousIdentityStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Identity backed by a client-persisted, unverified profile
pub struct AnonymousIdentityProvider<S> {
    storage: S,
}

impl<S: AnonymousIdentityStorage> AnonymousIdentityProvider<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Mint and persist an identity for the event
    pub async fn register(&self, event_id: &str, name: &str, email: &str) -> Result<VoterIdentity> {
        let voter = mint_anonymous(name, email)?;
        let value = serde_json::to_string(&voter)?;
        self.storage.set(&storage_key(event_id), value).await?;
        tracing::info!(event_id = %event_id, voter_id = %voter.id, "Registered anonymous voter");
        Ok(voter.to_identity())
    }
}

#[async_trait]
impl<S: AnonymousIdentityStorage> IdentityProvider for AnonymousIdentityProvider<S> {
    async fn resolve(&self, event_id: &str) -> Result<Resolution> {
        match self.storage.get(&storage_key(event_id)).await? {
            Some(raw) => {
                let voter: AnonymousVoter = serde_json::from_str(&raw)?;
                Ok(Resolution::Identified(voter.to_identity()))
            }
            None => Ok(Resolution::NeedsRegistration),
        }
    }
}

/// In-memory identity storage
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryIdentityStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnonymousIdentityStorage for InMemoryIdentityStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Identity storage kept as a JSON map in one local file
pub struct FileIdentityStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileIdentityStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(PollError::persistence(e)),
        }
    }
}

#[async_trait]
impl AnonymousIdentityStorage for FileIdentityStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);
        let bytes = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(PollError::persistence)
    }
}
