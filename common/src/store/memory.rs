use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CounterRepository, UserRepository};
use crate::error::StoreError;
use crate::models::{CounterKind, UserRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    counters: DashMap<CounterKind, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_one(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn replace_all(&self, records: Vec<UserRecord>) -> Result<(), StoreError> {
        let collection: HashMap<String, UserRecord> = records
            .into_iter()
            .map(|record| (record.username.clone(), record))
            .collect();

        *self.users.write().await = collection;
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.users.read().await.len())
    }
}

#[async_trait]
impl CounterRepository for MemoryStore {
    async fn increment(&self, kind: CounterKind) -> Result<u64, StoreError> {
        let mut value = self.counters.entry(kind).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn get(&self, kind: CounterKind) -> Result<u64, StoreError> {
        Ok(self.counters.get(&kind).map(|v| *v).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(username: &str) -> UserRecord {
        UserRecord {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
        }
    }

    #[tokio::test]
    async fn test_replace_all_discards_previous_collection() {
        let store = MemoryStore::new();
        store.replace_all(vec![record("a"), record("b")]).await.unwrap();
        store.replace_all(vec![record("c")]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_one("a").await.unwrap().is_none());
        assert_eq!(store.find_one("c").await.unwrap(), Some(record("c")));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment(CounterKind::Preview).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get(CounterKind::Preview).await.unwrap(), 50);
        assert_eq!(store.get(CounterKind::Download).await.unwrap(), 0);
    }
}
