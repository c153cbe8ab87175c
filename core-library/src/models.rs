//! Domain models for the music library
//!
//! Field names match the JSON documents and the HTTP API verbatim, so every
//! model round-trips through `serde` without renames.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Stored Item Abstraction
// =============================================================================

/// A record kept in one of the client store's collections.
///
/// Each implementor owns a fixed storage key and exposes the id used for
/// lookups, replacement and deletion.
pub trait StoredItem: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier type compared during lookups
    type Id: PartialEq + fmt::Debug + Send + Sync + ?Sized;

    /// Key under which the whole collection is serialised
    const STORAGE_KEY: &'static str;

    /// Identifier of this record
    fn item_id(&self) -> &Self::Id;
}

// =============================================================================
// Domain Models
// =============================================================================

/// A song of the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier
    pub id: u32,
    pub name: String,
    pub genre: String,
    pub artist: String,
    /// User preference, inverted by the like button
    #[serde(default)]
    pub liked: bool,
}

impl Song {
    pub fn new(id: u32, name: impl Into<String>, genre: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            genre: genre.into(),
            artist: artist.into(),
            liked: false,
        }
    }
}

impl StoredItem for Song {
    type Id = u32;
    const STORAGE_KEY: &'static str = "songs";

    fn item_id(&self) -> &u32 {
        &self.id
    }
}

/// Reference to a song by id, as stored inside a playlist
///
/// No integrity is enforced: a reference may point at an id that is not in
/// the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongRef {
    pub id: u32,
}

impl From<u32> for SongRef {
    fn from(id: u32) -> Self {
        Self { id }
    }
}

/// A named, ordered list of song references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique identifier
    pub id: String,
    pub name: String,
    pub description: String,
    /// Data URI or server file reference (`assets/img/<id>.<ext>`)
    pub thumbnail: String,
    /// Songs in playback order
    #[serde(default)]
    pub songs: Vec<SongRef>,
}

impl Playlist {
    /// Build a playlist from a draft under the given id
    pub fn from_draft(id: impl Into<String>, draft: PlaylistDraft) -> Self {
        Self {
            id: id.into(),
            name: draft.name,
            description: draft.description,
            thumbnail: draft.thumbnail,
            songs: draft.songs,
        }
    }

    /// Ids of the referenced songs in order
    pub fn song_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.songs.iter().map(|song| song.id)
    }
}

impl StoredItem for Playlist {
    type Id = str;
    const STORAGE_KEY: &'static str = "playlists";

    fn item_id(&self) -> &str {
        &self.id
    }
}

/// Editable playlist content without an id
///
/// Sent by the editor on create and update. Unknown fields (such as an `id`
/// echoed back by a client) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub songs: Vec<SongRef>,
}

impl PlaylistDraft {
    /// Validates that name, description and thumbnail are present
    ///
    /// Returns the name of the first empty field. Whitespace counts as
    /// content, as it does for a `required` form input.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("name");
        }
        if self.description.is_empty() {
            return Err("description");
        }
        if self.thumbnail.is_empty() {
            return Err("thumbnail");
        }
        Ok(())
    }
}

impl From<Playlist> for PlaylistDraft {
    fn from(playlist: Playlist) -> Self {
        Self {
            name: playlist.name,
            description: playlist.description,
            thumbnail: playlist.thumbnail,
            songs: playlist.songs,
        }
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Top-level shape of `songs.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongsDocument {
    #[serde(default)]
    pub songs: Vec<Song>,
}

/// Top-level shape of `playlists.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistsDocument {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

/// Initial collections written into an empty client store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    pub playlists: Vec<Playlist>,
    pub songs: Vec<Song>,
}

impl SeedData {
    pub fn new(playlists: Vec<Playlist>, songs: Vec<Song>) -> Self {
        Self { playlists, songs }
    }
}
