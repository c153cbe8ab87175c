//! In-memory key-value store

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::KeyValueStore};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Non-persistent `KeyValueStore` for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.values.read().await.keys().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        self.values.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryKeyValueStore::new();
        store.set_string("songs", "[]").await.unwrap();
        store.set_string("playlists", "[]").await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec!["playlists", "songs"]);
        assert!(store.has_key("songs").await.unwrap());

        store.clear_all().await.unwrap();
        assert_eq!(store.get_string("songs").await.unwrap(), None);
    }
}
