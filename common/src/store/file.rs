use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::{CounterRepository, UserRepository};
use crate::error::StoreError;
use crate::models::{CounterKind, UserRecord};

/// On-disk layout: one JSON document with both collections
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    users: Vec<UserRecord>,
    /// Keyed by counter name (`PreviewCount`, `DownloadCount`)
    #[serde(default)]
    counters: BTreeMap<String, u64>,
}

/// JSON document store. Every write goes to a sibling temp file that is then
/// renamed over the document, so readers see either the old or the new state.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles; plain reads do not take it.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the document, creating its directory if needed
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };

        // Fail fast on an unreadable or corrupt document
        store.read_document().await?;
        Ok(store)
    }

    async fn read_document(&self) -> Result<Document, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FileStore {
    async fn find_one(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let document = self.read_document().await?;
        Ok(document.users.into_iter().find(|user| user.username == username))
    }

    async fn replace_all(&self, records: Vec<UserRecord>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.users = records;
        self.write_document(&document).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read_document().await?.users.len())
    }
}

#[async_trait]
impl CounterRepository for FileStore {
    async fn increment(&self, kind: CounterKind) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let value = document.counters.entry(kind.var_name().to_string()).or_insert(0);
        *value += 1;
        let value = *value;
        self.write_document(&document).await?;
        Ok(value)
    }

    async fn get(&self, kind: CounterKind) -> Result<u64, StoreError> {
        let document = self.read_document().await?;
        Ok(document.counters.get(kind.var_name()).copied().unwrap_or(0))
    }
}
