//! Library browser
//!
//! Drives the library page: loads the stored collections, renders them
//! through an injected [`LibraryView`], narrows them with the search, and
//! flips the liked flag of a song.

use crate::error::Result;
use crate::models::{Playlist, SeedData, Song};
use crate::search::{self, SearchResults};
use crate::storage::StorageManager;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A rendered playlist card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    /// Link to the playlist page
    pub href: String,
    pub thumbnail: String,
    pub name: String,
    pub description: String,
}

impl From<&Playlist> for PlaylistItem {
    fn from(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id.clone(),
            href: format!("./playlist.html?id={}", playlist.id),
            thumbnail: playlist.thumbnail.clone(),
            name: playlist.name.clone(),
            description: playlist.description.clone(),
        }
    }
}

/// A rendered song row with its like button state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongItem {
    pub id: u32,
    pub name: String,
    pub genre: String,
    pub artist: String,
    pub liked: bool,
}

impl From<&Song> for SongItem {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            name: song.name.clone(),
            genre: song.genre.clone(),
            artist: song.artist.clone(),
            liked: song.liked,
        }
    }
}

/// Render port of the library page.
///
/// Each call replaces the whole list it targets.
pub trait LibraryView: Send + Sync {
    fn render_playlists(&self, items: Vec<PlaylistItem>);
    fn render_songs(&self, items: Vec<SongItem>);
}

/// Library page state
pub struct Library {
    storage: Arc<StorageManager>,
    view: Arc<dyn LibraryView>,
    event_bus: EventBus,
    playlists: Vec<Playlist>,
    songs: Vec<Song>,
}

impl Library {
    pub fn new(storage: Arc<StorageManager>, view: Arc<dyn LibraryView>, event_bus: EventBus) -> Self {
        Self {
            storage,
            view,
            event_bus,
            playlists: Vec::new(),
            songs: Vec::new(),
        }
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Seeds absent collections, reads both from storage and renders them.
    #[instrument(skip_all)]
    pub async fn load(&mut self, seed: &SeedData) -> Result<()> {
        self.storage.load_all_data(seed).await?;
        self.playlists = self.storage.get_data::<Playlist>().await?;
        self.songs = self.storage.get_data::<Song>().await?;

        self.generate_lists(&self.playlists, &self.songs);

        info!(
            playlists = self.playlists.len(),
            songs = self.songs.len(),
            "Library loaded"
        );
        self.emit(LibraryEvent::Loaded {
            playlist_count: self.playlists.len(),
            song_count: self.songs.len(),
        });
        Ok(())
    }

    /// Builds view items for both collections and hands them to the view.
    pub fn generate_lists(&self, playlists: &[Playlist], songs: &[Song]) {
        self.view
            .render_playlists(playlists.iter().map(PlaylistItem::from).collect());
        self.view
            .render_songs(songs.iter().map(SongItem::from).collect());
    }

    /// Filters the loaded collections and renders the matches.
    ///
    /// An empty query renders the full lists.
    pub fn search(&self, query: &str, exact: bool) -> SearchResults {
        let results = search::search(query, exact, &self.playlists, &self.songs);
        self.generate_lists(&results.playlists, &results.songs);

        debug!(
            query,
            exact,
            playlists = results.playlists.len(),
            songs = results.songs.len(),
            "Search rendered"
        );
        self.emit(LibraryEvent::SearchPerformed {
            query: query.to_string(),
            exact,
            playlist_matches: results.playlists.len(),
            song_matches: results.songs.len(),
        });
        results
    }

    /// Inverts the liked flag of `song_id` and persists the song.
    ///
    /// Returns the new value, or `None` when the id is not loaded.
    #[instrument(skip(self))]
    pub async fn toggle_like(&mut self, song_id: u32) -> Result<Option<bool>> {
        let Some(song) = self.songs.iter_mut().find(|song| song.id == song_id) else {
            debug!(song_id, "Like toggle for unknown song ignored");
            return Ok(None);
        };

        song.liked = !song.liked;
        let updated = song.clone();

        if let Err(e) = self.storage.replace_item(&updated).await {
            // Keep memory consistent with what is stored
            song.liked = !song.liked;
            return Err(e);
        }

        self.emit(LibraryEvent::SongLikeToggled {
            song_id,
            liked: updated.liked,
        });
        Ok(Some(updated.liked))
    }

    fn emit(&self, event: LibraryEvent) {
        self.event_bus.emit(CoreEvent::Library(event)).ok();
    }
}
