//! # Library Configuration Module
//!
//! Provides configuration management for the music library.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`LibraryConfig`] holding the paths of the JSON-backed server data, the
//! client store location, the server address, and any host bridges injected
//! up front. Validation is fail-fast: `build()` rejects empty paths, malformed
//! server URLs and unreasonable buffer sizes with an actionable message.
//!
//! ## Bridges
//!
//! - `FileSystemAccess` - Server data and thumbnail I/O (desktop default: tokio fs)
//! - `KeyValueStore` - Client-side persistent store (desktop default: SQLite)
//! - `HttpClient` - Remote playlist API transport (desktop default: reqwest)
//!
//! Bridges are optional here; `core-service` fills the gaps with desktop
//! defaults when the `desktop-shims` feature is enabled.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::LibraryConfig;
//!
//! let config = LibraryConfig::builder()
//!     .data_dir("./data")
//!     .server_url("http://localhost:5020")
//!     .build()
//!     .expect("valid config");
//!
//! assert!(config.songs_file.ends_with("songs.json"));
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{FileSystemAccess, HttpClient, KeyValueStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Default address the HTTP server binds to
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5020";

/// Default base URL the playlist API client talks to
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5020";

/// Default cap on request bodies, which carry thumbnails as base64 data URIs
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Music library configuration.
///
/// Use [`LibraryConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct LibraryConfig {
    /// Directory holding the server's JSON documents
    pub data_dir: PathBuf,

    /// JSON document with a top-level `songs` array
    pub songs_file: PathBuf,

    /// JSON document with a top-level `playlists` array
    pub playlists_file: PathBuf,

    /// Directory where uploaded playlist thumbnails are stored
    pub assets_dir: PathBuf,

    /// SQLite file backing the client key-value store
    pub store_path: PathBuf,

    /// Base URL of the library server (used by the API client and previews)
    pub server_url: String,

    /// Socket address the server binds to
    pub bind_address: SocketAddr,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// Largest request body the server accepts, in bytes
    pub max_upload_bytes: usize,

    /// File system access (optional with desktop default)
    pub file_system: Option<Arc<dyn FileSystemAccess>>,

    /// Client-side persistent store (optional with desktop default)
    pub key_value_store: Option<Arc<dyn KeyValueStore>>,

    /// HTTP transport for the remote API (optional with desktop default)
    pub http_client: Option<Arc<dyn HttpClient>>,
}

impl std::fmt::Debug for LibraryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryConfig")
            .field("data_dir", &self.data_dir)
            .field("songs_file", &self.songs_file)
            .field("playlists_file", &self.playlists_file)
            .field("assets_dir", &self.assets_dir)
            .field("store_path", &self.store_path)
            .field("server_url", &self.server_url)
            .field("bind_address", &self.bind_address)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field(
                "file_system",
                &self.file_system.as_ref().map(|_| "FileSystemAccess { ... }"),
            )
            .field(
                "key_value_store",
                &self.key_value_store.as_ref().map(|_| "KeyValueStore { ... }"),
            )
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .finish()
    }
}

impl LibraryConfig {
    /// Creates a new builder for constructing a `LibraryConfig`.
    pub fn builder() -> LibraryConfigBuilder {
        LibraryConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - No path is empty
    /// - The server URL is an absolute http(s) URL
    /// - The event buffer size is in `1..=10_000`
    /// - The upload limit is not zero
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("Data directory", &self.data_dir),
            ("Songs file", &self.songs_file),
            ("Playlists file", &self.playlists_file),
            ("Assets directory", &self.assets_dir),
            ("Store path", &self.store_path),
        ];
        for (label, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", label)));
            }
        }

        let url = self.server_url.trim();
        let has_scheme = url.starts_with("http://") || url.starts_with("https://");
        let host = url.split("://").nth(1).unwrap_or_default();
        if !has_scheme || host.is_empty() {
            return Err(Error::Config(format!(
                "Server URL must be an absolute http(s) URL, got '{}'",
                self.server_url
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        if self.max_upload_bytes == 0 {
            return Err(Error::Config(
                "Max upload size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Server URL without a trailing slash, ready for path concatenation
    pub fn base_url(&self) -> &str {
        self.server_url.trim().trim_end_matches('/')
    }
}

/// Builder for constructing [`LibraryConfig`] instances.
///
/// Only the data directory is required; every other path defaults to a
/// location inside it.
#[derive(Default)]
pub struct LibraryConfigBuilder {
    data_dir: Option<PathBuf>,
    songs_file: Option<PathBuf>,
    playlists_file: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    store_path: Option<PathBuf>,
    server_url: Option<String>,
    bind_address: Option<String>,
    event_buffer_size: Option<usize>,
    max_upload_bytes: Option<usize>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    key_value_store: Option<Arc<dyn KeyValueStore>>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl LibraryConfigBuilder {
    /// Sets the data directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::LibraryConfig;
    ///
    /// let builder = LibraryConfig::builder().data_dir("/srv/library");
    /// ```
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Overrides the songs document path (default: `<data_dir>/songs.json`).
    pub fn songs_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.songs_file = Some(path.into());
        self
    }

    /// Overrides the playlists document path (default: `<data_dir>/playlists.json`).
    pub fn playlists_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.playlists_file = Some(path.into());
        self
    }

    /// Overrides the thumbnail directory (default: `<data_dir>/assets/img`).
    pub fn assets_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.assets_dir = Some(path.into());
        self
    }

    /// Overrides the client store file (default: `<data_dir>/library.db`).
    pub fn store_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Sets the server base URL.
    ///
    /// Default: `http://localhost:5020`
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Sets the bind address, e.g. `0.0.0.0:8080`.
    ///
    /// Default: `127.0.0.1:5020`
    pub fn bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = Some(address.into());
        self
    }

    /// Sets the event bus capacity.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Caps request bodies, thumbnails included.
    ///
    /// Default: 16 MiB
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Injects a file system implementation.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Injects a client key-value store implementation.
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    /// Injects an HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the data directory is missing, the bind
    /// address does not parse, or [`LibraryConfig::validate`] fails.
    pub fn build(self) -> Result<LibraryConfig> {
        let data_dir = self.data_dir.ok_or_else(|| {
            Error::Config(
                "Data directory is required. Call .data_dir() with the folder that \
                 holds songs.json and playlists.json."
                    .to_string(),
            )
        })?;

        let bind_raw = self
            .bind_address
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_raw.parse::<SocketAddr>().map_err(|e| {
            Error::Config(format!("Invalid bind address '{}': {}", bind_raw, e))
        })?;

        let config = LibraryConfig {
            songs_file: self
                .songs_file
                .unwrap_or_else(|| data_dir.join("songs.json")),
            playlists_file: self
                .playlists_file
                .unwrap_or_else(|| data_dir.join("playlists.json")),
            assets_dir: self
                .assets_dir
                .unwrap_or_else(|| data_dir.join("assets").join("img")),
            store_path: self
                .store_path
                .unwrap_or_else(|| data_dir.join("library.db")),
            data_dir,
            server_url: self
                .server_url
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            bind_address,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            file_system: self.file_system,
            key_value_store: self.key_value_store,
            http_client: self.http_client,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_builder_requires_data_dir() {
        let result = LibraryConfig::builder().build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Data directory")));
    }

    #[test]
    fn test_defaults_derive_from_data_dir() {
        let config = LibraryConfig::builder().data_dir("/srv/music").build().unwrap();

        assert_eq!(config.songs_file, Path::new("/srv/music/songs.json"));
        assert_eq!(config.playlists_file, Path::new("/srv/music/playlists.json"));
        assert_eq!(config.assets_dir, Path::new("/srv/music/assets/img"));
        assert_eq!(config.store_path, Path::new("/srv/music/library.db"));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.bind_address.to_string(), DEFAULT_BIND_ADDRESS);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.file_system.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = LibraryConfig::builder()
            .data_dir("data")
            .songs_file("fixtures/songs.json")
            .assets_dir("public/img")
            .bind_address("0.0.0.0:8080")
            .server_url("https://music.example.org/")
            .event_buffer_size(16)
            .max_upload_bytes(1024)
            .build()
            .unwrap();

        assert_eq!(config.songs_file, Path::new("fixtures/songs.json"));
        assert_eq!(config.playlists_file, Path::new("data/playlists.json"));
        assert_eq!(config.assets_dir, Path::new("public/img"));
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.base_url(), "https://music.example.org");
        assert_eq!(config.event_buffer_size, 16);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_rejects_invalid_bind_address() {
        let result = LibraryConfig::builder()
            .data_dir("data")
            .bind_address("localhost")
            .build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("bind address")));
    }

    #[test]
    fn test_rejects_relative_server_url() {
        for url in ["localhost:5020", "http://", "ftp://host"] {
            let result = LibraryConfig::builder()
                .data_dir("data")
                .server_url(url)
                .build();
            assert!(result.is_err(), "{} should be rejected", url);
        }
    }

    #[test]
    fn test_rejects_event_buffer_bounds() {
        assert!(LibraryConfig::builder()
            .data_dir("data")
            .event_buffer_size(0)
            .build()
            .is_err());
        assert!(LibraryConfig::builder()
            .data_dir("data")
            .event_buffer_size(MAX_EVENT_BUFFER_SIZE + 1)
            .build()
            .is_err());
    }

    #[test]
    fn test_rejects_zero_upload_limit() {
        let result = LibraryConfig::builder()
            .data_dir("data")
            .max_upload_bytes(0)
            .build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("upload")));
    }

    #[test]
    fn test_rejects_empty_data_dir() {
        let result = LibraryConfig::builder().data_dir("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_is_cloneable_and_debug() {
        let config = LibraryConfig::builder().data_dir("data").build().unwrap();
        let cloned = config.clone();
        assert_eq!(config.data_dir, cloned.data_dir);
        assert!(format!("{:?}", cloned).contains("LibraryConfig"));
    }
}
