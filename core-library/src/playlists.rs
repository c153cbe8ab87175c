//! Playlists manager over `playlists.json`
//!
//! Inline thumbnails are moved into the thumbnail store on create and update
//! so the document only ever holds server references.

use crate::document::{Change, JsonDocument};
use crate::error::{LibraryError, Result};
use crate::models::{Playlist, PlaylistDraft, PlaylistsDocument};
use crate::thumbnail::{is_data_uri, ThumbnailStore};
use bridge_traits::storage::FileSystemAccess;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct PlaylistsManager {
    document: JsonDocument<PlaylistsDocument>,
    thumbnails: ThumbnailStore,
    event_bus: EventBus,
}

impl PlaylistsManager {
    pub fn new(
        path: impl Into<PathBuf>,
        thumbnails: ThumbnailStore,
        fs: Arc<dyn FileSystemAccess>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            document: JsonDocument::new(path, fs),
            thumbnails,
            event_bus,
        }
    }

    pub fn thumbnails(&self) -> &ThumbnailStore {
        &self.thumbnails
    }

    pub fn revision(&self) -> u64 {
        self.document.revision()
    }

    pub async fn get_all_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.document.read().await?.playlists)
    }

    pub async fn get_playlist_by_id(&self, id: &str) -> Result<Option<Playlist>> {
        let playlists = self.get_all_playlists().await?;
        Ok(playlists.into_iter().find(|playlist| playlist.id == id))
    }

    /// Creates a playlist under a fresh id.
    ///
    /// # Errors
    ///
    /// [`LibraryError::InvalidInput`] when name, description or thumbnail is
    /// empty; [`LibraryError::Thumbnail`] when an inline image cannot be decoded.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add_playlist(&self, draft: PlaylistDraft) -> Result<Playlist> {
        validate(&draft)?;

        let id = Uuid::new_v4().to_string();
        let thumbnail = self.thumbnails.store(&id, &draft.thumbnail).await?;
        let playlist = Playlist::from_draft(
            id,
            PlaylistDraft {
                thumbnail,
                ..draft
            },
        );

        let stored = playlist.clone();
        self.document
            .update(move |document| {
                document.playlists.push(stored);
                Change::Commit(())
            })
            .await?;

        info!(playlist_id = %playlist.id, "Playlist created");
        self.emit(LibraryEvent::PlaylistCreated {
            playlist_id: playlist.id.clone(),
            name: playlist.name.clone(),
        });
        Ok(playlist)
    }

    /// Replaces the content of playlist `id`.
    ///
    /// The thumbnail is replaced wholesale: a new inline image is stored (and
    /// an old file under a different name removed). The current reference may
    /// be sent back unchanged; any other reference must point at this
    /// playlist's own file. Returns `None` when the playlist does not exist.
    #[instrument(skip(self, draft))]
    pub async fn update_playlist(&self, id: &str, draft: PlaylistDraft) -> Result<Option<Playlist>> {
        validate(&draft)?;

        let Some(previous) = self.get_playlist_by_id(id).await? else {
            debug!(playlist_id = id, "Update for unknown playlist ignored");
            return Ok(None);
        };

        let uploaded = is_data_uri(&draft.thumbnail);
        let thumbnail = if draft.thumbnail == previous.thumbnail {
            previous.thumbnail.clone()
        } else {
            self.thumbnails.store(id, &draft.thumbnail).await?
        };
        let playlist = Playlist::from_draft(
            id,
            PlaylistDraft {
                thumbnail,
                ..draft
            },
        );

        let replacement = playlist.clone();
        let replaced = self
            .document
            .update(move |document| {
                match document.playlists.iter_mut().find(|p| p.id == replacement.id) {
                    Some(slot) => {
                        *slot = replacement;
                        Change::Commit(true)
                    }
                    None => Change::Discard(false),
                }
            })
            .await?;

        if !replaced {
            // Deleted concurrently between the lookup and the write
            if uploaded {
                self.thumbnails.delete(id, &playlist.thumbnail).await?;
            }
            debug!(playlist_id = id, "Playlist vanished during update");
            return Ok(None);
        }

        if previous.thumbnail != playlist.thumbnail {
            self.thumbnails.delete(id, &previous.thumbnail).await?;
        }

        info!(playlist_id = id, "Playlist updated");
        self.emit(LibraryEvent::PlaylistUpdated {
            playlist_id: playlist.id.clone(),
            name: playlist.name.clone(),
        });
        Ok(Some(playlist))
    }

    /// Removes exactly the playlist `id` and its stored thumbnail.
    #[instrument(skip(self))]
    pub async fn delete_playlist(&self, id: &str) -> Result<bool> {
        let removed = self
            .document
            .update(|document| {
                match document.playlists.iter().position(|p| p.id == id) {
                    Some(index) => Change::Commit(Some(document.playlists.remove(index))),
                    None => Change::Discard(None),
                }
            })
            .await?;

        let Some(playlist) = removed else {
            debug!(playlist_id = id, "Delete for unknown playlist ignored");
            return Ok(false);
        };

        if let Err(e) = self.thumbnails.delete(id, &playlist.thumbnail).await {
            warn!(playlist_id = id, error = %e, "Failed to delete thumbnail");
        }

        info!(playlist_id = id, "Playlist deleted");
        self.emit(LibraryEvent::PlaylistDeleted {
            playlist_id: playlist.id,
        });
        Ok(true)
    }

    /// Overwrites all playlists (seeding and tests).
    pub async fn replace_all(&self, playlists: Vec<Playlist>) -> Result<()> {
        self.document.replace(&PlaylistsDocument { playlists }).await
    }

    fn emit(&self, event: LibraryEvent) {
        self.event_bus.emit(CoreEvent::Library(event)).ok();
    }
}

fn validate(draft: &PlaylistDraft) -> Result<()> {
    draft
        .validate()
        .map_err(|field| LibraryError::invalid(field, format!("Playlist {} is required", field)))
}
