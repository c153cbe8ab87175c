//! Client-side storage manager
//!
//! Keeps the song and playlist collections in the host [`KeyValueStore`],
//! one JSON array per fixed key (`"songs"`, `"playlists"`). Every mutation
//! rewrites the whole collection under its key.

use crate::error::Result;
use crate::models::{Playlist, SeedData, Song, StoredItem};
use bridge_traits::storage::KeyValueStore;
use core_runtime::events::{CoreEvent, EventBus, StorageEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Storage key of the song collection
pub const STORAGE_KEY_SONGS: &str = Song::STORAGE_KEY;
/// Storage key of the playlist collection
pub const STORAGE_KEY_PLAYLISTS: &str = Playlist::STORAGE_KEY;

/// Typed access to the collections held in the client store.
pub struct StorageManager {
    store: Arc<dyn KeyValueStore>,
    event_bus: EventBus,
    // Serialises read-modify-write cycles issued through this manager
    write_lock: Mutex<()>,
}

impl StorageManager {
    pub fn new(store: Arc<dyn KeyValueStore>, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            write_lock: Mutex::new(()),
        }
    }

    /// Writes the seed collections for keys that are absent.
    ///
    /// Existing collections are left untouched. Returns the keys written.
    pub async fn load_all_data(&self, seed: &SeedData) -> Result<Vec<String>> {
        let _guard = self.write_lock.lock().await;
        let mut seeded = Vec::new();

        if !self.store.has_key(STORAGE_KEY_PLAYLISTS).await? {
            self.write_collection(STORAGE_KEY_PLAYLISTS, &seed.playlists)
                .await?;
            seeded.push(STORAGE_KEY_PLAYLISTS.to_string());
        }
        if !self.store.has_key(STORAGE_KEY_SONGS).await? {
            self.write_collection(STORAGE_KEY_SONGS, &seed.songs).await?;
            seeded.push(STORAGE_KEY_SONGS.to_string());
        }

        if !seeded.is_empty() {
            info!(keys = ?seeded, "Seeded client storage");
            self.event_bus
                .emit(CoreEvent::Storage(StorageEvent::Seeded {
                    keys: seeded.clone(),
                }))
                .ok();
        }

        Ok(seeded)
    }

    /// Returns the stored collection, or an empty one when the key is absent.
    pub async fn get_data<T: StoredItem>(&self) -> Result<Vec<T>> {
        match self.store.get_string(T::STORAGE_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_item_by_id<T: StoredItem>(&self, id: &T::Id) -> Result<Option<T>> {
        let items = self.get_data::<T>().await?;
        Ok(items.into_iter().find(|item| item.item_id() == id))
    }

    /// Appends `item` to its collection.
    pub async fn add_item<T: StoredItem>(&self, item: T) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.get_data::<T>().await?;
        items.push(item);
        self.write_collection(T::STORAGE_KEY, &items).await
    }

    /// Replaces the element with the same id and rewrites the collection.
    ///
    /// Returns `false` without writing when no element matches.
    pub async fn replace_item<T: StoredItem>(&self, item: &T) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.get_data::<T>().await?;

        let Some(slot) = items.iter_mut().find(|i| i.item_id() == item.item_id()) else {
            debug!(key = T::STORAGE_KEY, id = ?item.item_id(), "Replace missed, nothing written");
            return Ok(false);
        };
        *slot = item.clone();

        self.write_collection(T::STORAGE_KEY, &items).await?;
        Ok(true)
    }

    /// Removes the element with `id`. Returns whether anything was removed.
    pub async fn delete_item<T: StoredItem>(&self, id: &T::Id) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.get_data::<T>().await?;
        let before = items.len();
        items.retain(|item| item.item_id() != id);

        if items.len() == before {
            return Ok(false);
        }
        self.write_collection(T::STORAGE_KEY, &items).await?;
        Ok(true)
    }

    /// Removes both collections.
    pub async fn reset_all_data(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(STORAGE_KEY_SONGS).await?;
        self.store.delete(STORAGE_KEY_PLAYLISTS).await?;

        info!("Client storage reset");
        self.event_bus
            .emit(CoreEvent::Storage(StorageEvent::Reset))
            .ok();
        Ok(())
    }

    async fn write_collection<T: serde::Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set_string(key, &raw).await?;
        debug!(key, count = items.len(), "Collection written");
        Ok(())
    }
}
