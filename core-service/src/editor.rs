//! Playlist editor
//!
//! State machine behind the create/edit playlist form. Songs are picked by
//! name into ordered slots; the draft's song references are recomputed from
//! the slots on every change, silently dropping names that match no song.

use crate::api::PlaylistApi;
use crate::error::{CoreError, Result};
use core_library::thumbnail::{encode_data_uri, is_data_uri};
use core_library::{Playlist, PlaylistDraft, Song, SongRef};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct PlaylistEditor {
    api: Arc<dyn PlaylistApi>,
    server_url: String,
    catalogue: Vec<Song>,
    added_songs: Vec<String>,
    draft: PlaylistDraft,
    preview: String,
    editing_id: Option<String>,
}

impl PlaylistEditor {
    /// Creates an empty editor with a single blank song slot.
    pub fn new(api: Arc<dyn PlaylistApi>, server_url: impl Into<String>) -> Self {
        Self {
            api,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            catalogue: Vec::new(),
            added_songs: vec![String::new()],
            draft: PlaylistDraft::default(),
            preview: String::new(),
            editing_id: None,
        }
    }

    pub fn catalogue(&self) -> &[Song] {
        &self.catalogue
    }

    pub fn added_songs(&self) -> &[String] {
        &self.added_songs
    }

    pub fn draft(&self) -> &PlaylistDraft {
        &self.draft
    }

    /// Image source for the preview: a server URL or a data URI
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Loads the song catalogue and, when `id` is given, the playlist to edit.
    ///
    /// # Errors
    ///
    /// [`CoreError::Api`] with status 404 when the playlist does not exist.
    #[instrument(skip(self))]
    pub async fn load(&mut self, id: Option<&str>) -> Result<()> {
        self.catalogue = self.api.get_all_songs().await?;

        let Some(id) = id else {
            debug!(songs = self.catalogue.len(), "Editor ready for a new playlist");
            return Ok(());
        };

        let playlist = self.api.get_playlist_by_id(id).await?.ok_or_else(|| CoreError::Api {
            status: 404,
            message: format!("Playlist {} not found", id),
        })?;

        self.added_songs = playlist
            .song_ids()
            .map(|song_id| self.get_name_from_id(song_id))
            .collect();
        if self.added_songs.is_empty() {
            self.added_songs.push(String::new());
        }

        self.preview = format!("{}/{}", self.server_url, playlist.thumbnail);
        self.editing_id = Some(playlist.id.clone());
        self.load_for_edit(playlist).await?;

        info!(playlist_id = id, "Playlist loaded for editing");
        Ok(())
    }

    // Re-encodes the stored thumbnail so an unchanged image survives submit
    async fn load_for_edit(&mut self, playlist: Playlist) -> Result<()> {
        let reference = playlist.thumbnail.clone();
        self.draft = PlaylistDraft::from(playlist);

        if reference.is_empty() || is_data_uri(&reference) {
            return Ok(());
        }

        match self.api.fetch_thumbnail(&reference).await {
            Ok(image) => {
                self.draft.thumbnail = encode_data_uri(&image.bytes, &image.content_type);
            }
            Err(e) => {
                // The reference itself is still a valid thumbnail for the server
                warn!(thumbnail = %reference, error = %e, "Could not fetch thumbnail");
            }
        }
        Ok(())
    }

    /// Appends an empty song slot.
    pub fn add_song_slot(&mut self) {
        self.added_songs.push(String::new());
    }

    /// Removes the slot at `index` and recomputes the song references.
    ///
    /// The first slot cannot be removed. Returns whether a slot was removed.
    pub fn remove_song_slot(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.added_songs.len() {
            return false;
        }
        self.added_songs.remove(index);
        self.refresh_song_refs();
        true
    }

    /// Sets the song name typed into slot `index`.
    ///
    /// Returns `false` when the slot does not exist.
    pub fn set_song(&mut self, index: usize, name: impl Into<String>) -> bool {
        let Some(slot) = self.added_songs.get_mut(index) else {
            return false;
        };
        *slot = name.into();
        self.refresh_song_refs();
        true
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Replaces the thumbnail with an uploaded image.
    pub fn set_thumbnail(&mut self, bytes: &[u8], mime: &str) {
        let uri = encode_data_uri(bytes, mime);
        self.preview = uri.clone();
        self.draft.thumbnail = uri;
    }

    /// Creates or updates the playlist.
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] without any remote call when the name,
    /// description or thumbnail is empty.
    #[instrument(skip(self), fields(editing = ?self.editing_id))]
    pub async fn submit(&mut self) -> Result<Playlist> {
        self.draft
            .validate()
            .map_err(|field| CoreError::validation(field, format!("Playlist {} is required", field)))?;

        let playlist = match &self.editing_id {
            Some(id) => self
                .api
                .update_playlist(id, &self.draft)
                .await?
                .ok_or_else(|| CoreError::Api {
                    status: 404,
                    message: format!("Playlist {} not found", id),
                })?,
            None => self.api.add_new_playlist(&self.draft).await?,
        };

        info!(playlist_id = %playlist.id, "Playlist submitted");
        Ok(playlist)
    }

    /// Deletes the playlist being edited.
    pub async fn delete(&self) -> Result<bool> {
        let id = self
            .editing_id
            .as_deref()
            .ok_or_else(|| CoreError::validation("id", "No playlist is being edited"))?;

        let deleted = self.api.delete_playlist(id).await?;
        info!(playlist_id = id, deleted, "Playlist delete requested");
        Ok(deleted)
    }

    /// Id of the first catalogue song named exactly `name`.
    pub fn get_id_from_name(&self, name: &str) -> Option<u32> {
        self.catalogue
            .iter()
            .find(|song| song.name == name)
            .map(|song| song.id)
    }

    /// Name of song `id`, or an empty string when unknown.
    pub fn get_name_from_id(&self, id: u32) -> String {
        self.catalogue
            .iter()
            .find(|song| song.id == id)
            .map(|song| song.name.clone())
            .unwrap_or_default()
    }

    fn refresh_song_refs(&mut self) {
        self.draft.songs = self
            .added_songs
            .iter()
            .filter_map(|name| self.get_id_from_name(name))
            .map(SongRef::from)
            .collect();
    }
}
