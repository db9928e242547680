// Storage backend selection
// Decision: Use enum dispatch for backend selection; engines see one trait object
//
// Either PostgreSQL (production) or in-memory (dev mode) storage, exposed to
// the poll engines as a shared PollStore.

use anyhow::{Context, Result};
use gatherpoll_core::{InMemoryPollStore, SharedPollStore};
use gatherpoll_storage::{Database, DbPollStore};
use std::sync::Arc;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory store (dev mode)
    InMemory(InMemoryPollStore),
}

impl StorageBackend {
    /// Connect to PostgreSQL and apply migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to run migrations")?;
        Ok(Self::Postgres(db))
    }

    pub fn in_memory() -> Self {
        Self::InMemory(InMemoryPollStore::new())
    }

    /// Postgres when a URL is configured, in-memory otherwise
    pub async fn from_database_url(database_url: Option<&str>) -> Result<Self> {
        match database_url {
            Some(url) => Self::postgres(url).await,
            None => Ok(Self::in_memory()),
        }
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "memory",
        }
    }

    /// Shared store handed to both data channels
    pub fn poll_store(&self) -> SharedPollStore {
        match self {
            Self::Postgres(db) => Arc::new(DbPollStore::new(db.clone())),
            Self::InMemory(store) => Arc::new(store.clone()),
        }
    }
}
