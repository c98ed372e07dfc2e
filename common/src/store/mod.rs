//! Persistence for user records and file counters.
//!
//! Two backends share the same traits: an in-memory store for tests and demos,
//! and a single JSON document on disk.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{StoreConfig, StoreKind};
use crate::error::StoreError;
use crate::models::{CounterKind, UserRecord};

/// User collection
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up one record by username
    async fn find_one(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Replace the whole collection in a single step
    async fn replace_all(&self, records: Vec<UserRecord>) -> Result<(), StoreError>;

    /// Number of stored records
    async fn count(&self) -> Result<usize, StoreError>;
}

/// Preview/download counters
#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Add one to the counter and return the new value
    async fn increment(&self, kind: CounterKind) -> Result<u64, StoreError>;

    async fn get(&self, kind: CounterKind) -> Result<u64, StoreError>;
}

/// Handles onto one opened backend
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub counters: Arc<dyn CounterRepository>,
}

impl Stores {
    fn from_backend<T>(backend: Arc<T>) -> Self
    where
        T: UserRepository + CounterRepository + 'static,
    {
        Self {
            users: backend.clone(),
            counters: backend,
        }
    }
}

/// Open the backend selected by configuration
pub async fn open(config: &StoreConfig) -> Result<Stores, StoreError> {
    match config.kind {
        StoreKind::Memory => {
            tracing::info!("Using in-memory document store");
            Ok(Stores::from_backend(Arc::new(MemoryStore::new())))
        }
        StoreKind::File => {
            let store = FileStore::open(PathBuf::from(&config.path)).await?;
            tracing::info!("Using document store at {}", config.path);
            Ok(Stores::from_backend(Arc::new(store)))
        }
    }
}
