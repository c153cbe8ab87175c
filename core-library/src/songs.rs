//! Songs manager over `songs.json`

use crate::document::{Change, JsonDocument};
use crate::error::Result;
use crate::models::{Song, SongsDocument};
use bridge_traits::storage::FileSystemAccess;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Backend access to the song catalogue.
///
/// Reads parse the document on every call; the like toggle is a single
/// guarded read-modify-write so concurrent toggles are never lost.
pub struct SongsManager {
    document: JsonDocument<SongsDocument>,
    event_bus: EventBus,
}

impl SongsManager {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystemAccess>, event_bus: EventBus) -> Self {
        Self {
            document: JsonDocument::new(path, fs),
            event_bus,
        }
    }

    /// Revision of the underlying document
    pub fn revision(&self) -> u64 {
        self.document.revision()
    }

    /// All songs in file order.
    pub async fn get_all_songs(&self) -> Result<Vec<Song>> {
        Ok(self.document.read().await?.songs)
    }

    /// The song with `id`, or `None`.
    pub async fn get_song_by_id(&self, id: u32) -> Result<Option<Song>> {
        let songs = self.get_all_songs().await?;
        Ok(songs.into_iter().find(|song| song.id == id))
    }

    /// Inverts the liked flag of song `id` and persists the document.
    ///
    /// Returns the new value, or `None` without writing when the id is unknown.
    #[instrument(skip(self))]
    pub async fn update_song_like(&self, id: u32) -> Result<Option<bool>> {
        let liked = self
            .document
            .update(|document| match document.songs.iter_mut().find(|s| s.id == id) {
                Some(song) => {
                    song.liked = !song.liked;
                    Change::Commit(Some(song.liked))
                }
                None => Change::Discard(None),
            })
            .await?;

        match liked {
            Some(liked) => {
                info!(song_id = id, liked, "Song like updated");
                self.event_bus
                    .emit(CoreEvent::Library(LibraryEvent::SongLikeToggled {
                        song_id: id,
                        liked,
                    }))
                    .ok();
            }
            None => debug!(song_id = id, "Like toggle for unknown song ignored"),
        }

        Ok(liked)
    }

    /// Overwrites the catalogue (seeding and tests).
    pub async fn replace_all(&self, songs: Vec<Song>) -> Result<()> {
        self.document.replace(&SongsDocument { songs }).await
    }
}
