//! # Library Management Module
//!
//! Owns the song catalogue and the playlists, both on the client side and on
//! the file-backed server side.
//!
//! ## Overview
//!
//! This module manages:
//! - Domain models (`Song`, `Playlist`, `SongRef`, `PlaylistDraft`)
//! - Substring search over both collections
//! - The client `StorageManager` over a host `KeyValueStore`
//! - The `Library` browser and its `LibraryView` render port
//! - The `SongsManager` and `PlaylistsManager` over JSON documents
//! - Thumbnail decoding and storage

pub mod browser;
pub mod document;
pub mod error;
pub mod models;
pub mod playlists;
pub mod search;
pub mod songs;
pub mod storage;
pub mod thumbnail;

pub use browser::{Library, LibraryView, PlaylistItem, SongItem};
pub use document::{Change, JsonDocument};
pub use error::{LibraryError, Result};
pub use models::{Playlist, PlaylistDraft, SeedData, Song, SongRef, StoredItem};
pub use playlists::PlaylistsManager;
pub use search::{search, SearchResults};
pub use songs::SongsManager;
pub use storage::StorageManager;
pub use thumbnail::ThumbnailStore;
