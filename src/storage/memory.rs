use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, Record};
use crate::Result;

/// In-memory store. State is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `record`.
    pub fn with_record(record: Record) -> Self {
        Self {
            entries: RwLock::new(record),
        }
    }

    /// Copy of everything currently stored.
    pub async fn snapshot(&self) -> Record {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Record> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(*k).map(|v| ((*k).to_owned(), v.clone())))
            .collect())
    }

    async fn set(&self, record: Record) -> Result<()> {
        self.entries.write().await.extend(record);
        Ok(())
    }
}
