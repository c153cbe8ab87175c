//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, filesystem,
//! client key-value store) into the music library core. Desktop and server
//! hosts typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) and call [`bootstrap_desktop`]; other hosts build a
//! [`ServiceDependencies`] bundle themselves.

pub mod api;
pub mod editor;
pub mod error;

pub use api::{HttpPlaylistApi, PlaylistApi, ThumbnailData};
pub use editor::PlaylistEditor;
pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    storage::{FileSystemAccess, KeyValueStore},
};
use core_library::{
    Library, LibraryView, PlaylistsManager, SeedData, SongsManager, StorageManager, ThumbnailStore,
};
use core_runtime::config::LibraryConfig;
use core_runtime::events::EventBus;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct ServiceDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub filesystem: Arc<dyn FileSystemAccess>,
    pub key_value_store: Arc<dyn KeyValueStore>,
}

impl ServiceDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        filesystem: Arc<dyn FileSystemAccess>,
        key_value_store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            http_client,
            filesystem,
            key_value_store,
        }
    }

    /// Take every bridge from the configuration.
    ///
    /// # Errors
    ///
    /// [`CoreError::CapabilityMissing`] naming the first bridge not injected.
    pub fn from_config(config: &LibraryConfig) -> Result<Self> {
        fn require<T: ?Sized>(bridge: &Option<Arc<T>>, capability: &str) -> Result<Arc<T>> {
            bridge.clone().ok_or_else(|| CoreError::CapabilityMissing {
                capability: capability.to_string(),
                message: "Inject it through LibraryConfigBuilder or enable desktop-shims"
                    .to_string(),
            })
        }

        Ok(Self {
            http_client: require(&config.http_client, "HttpClient")?,
            filesystem: require(&config.file_system, "FileSystemAccess")?,
            key_value_store: require(&config.key_value_store, "KeyValueStore")?,
        })
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<LibraryConfig>,
    deps: Arc<ServiceDependencies>,
    event_bus: EventBus,
    songs: Arc<SongsManager>,
    playlists: Arc<PlaylistsManager>,
    storage: Arc<StorageManager>,
}

impl CoreService {
    /// Create a new service from the provided configuration and dependencies.
    pub fn new(config: LibraryConfig, deps: ServiceDependencies) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);
        let fs = Arc::clone(&deps.filesystem);

        let songs = SongsManager::new(config.songs_file.clone(), fs.clone(), event_bus.clone());
        let playlists = PlaylistsManager::new(
            config.playlists_file.clone(),
            ThumbnailStore::new(config.assets_dir.clone(), fs.clone()),
            fs,
            event_bus.clone(),
        );
        let storage = StorageManager::new(Arc::clone(&deps.key_value_store), event_bus.clone());

        Self {
            config: Arc::new(config),
            deps: Arc::new(deps),
            event_bus,
            songs: Arc::new(songs),
            playlists: Arc::new(playlists),
            storage: Arc::new(storage),
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<ServiceDependencies> {
        Arc::clone(&self.deps)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn songs(&self) -> Arc<SongsManager> {
        Arc::clone(&self.songs)
    }

    pub fn playlists(&self) -> Arc<PlaylistsManager> {
        Arc::clone(&self.playlists)
    }

    pub fn storage(&self) -> Arc<StorageManager> {
        Arc::clone(&self.storage)
    }

    /// HTTP client for the configured server.
    pub fn playlist_api(&self) -> Arc<dyn PlaylistApi> {
        Arc::new(HttpPlaylistApi::new(
            Arc::clone(&self.deps.http_client),
            self.config.base_url(),
        ))
    }

    /// A fresh editor talking to the configured server.
    pub fn playlist_editor(&self) -> PlaylistEditor {
        PlaylistEditor::new(self.playlist_api(), self.config.base_url())
    }

    /// Current server-side collections, used to seed the client store.
    pub async fn seed_data(&self) -> Result<SeedData> {
        Ok(SeedData::new(
            self.playlists.get_all_playlists().await?,
            self.songs.get_all_songs().await?,
        ))
    }

    /// Builds a library browser over the client store and loads it.
    pub async fn open_library(&self, view: Arc<dyn LibraryView>) -> Result<Library> {
        let seed = self.seed_data().await?;
        let mut library = Library::new(self.storage(), view, self.event_bus.clone());
        library.load(&seed).await?;
        Ok(library)
    }
}

/// Convenience bootstrapper for desktop and server hosts.
///
/// Bridges already injected in `config` win; the rest default to the
/// `bridge-desktop` implementations. The client store lives at
/// `config.store_path`.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_runtime::config::LibraryConfig;
///
/// let config = LibraryConfig::builder().data_dir("./data").build()?;
/// let core = core_service::bootstrap_desktop(config).await?;
/// let songs = core.songs().get_all_songs().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(config: LibraryConfig) -> Result<CoreService> {
    use bridge_desktop::{ReqwestHttpClient, SqliteKeyValueStore, TokioFileSystem};

    let filesystem: Arc<dyn FileSystemAccess> = match &config.file_system {
        Some(fs) => Arc::clone(fs),
        None => Arc::new(TokioFileSystem::new()),
    };

    filesystem.create_dir_all(&config.data_dir).await?;
    filesystem.create_dir_all(&config.assets_dir).await?;

    let key_value_store: Arc<dyn KeyValueStore> = match &config.key_value_store {
        Some(store) => Arc::clone(store),
        None => Arc::new(
            SqliteKeyValueStore::new(config.store_path.clone())
                .await
                .map_err(|e| CoreError::InitializationFailed(e.to_string()))?,
        ),
    };

    let http_client: Arc<dyn HttpClient> = match &config.http_client {
        Some(client) => Arc::clone(client),
        None => Arc::new(
            ReqwestHttpClient::new().map_err(|e| CoreError::InitializationFailed(e.to_string()))?,
        ),
    };

    tracing::info!(data_dir = ?config.data_dir, "Desktop bridges ready");
    Ok(CoreService::new(
        config,
        ServiceDependencies::new(http_client, filesystem, key_value_store),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::{MemoryKeyValueStore, ReqwestHttpClient, TokioFileSystem};
    use core_library::{PlaylistItem, Song, SongItem};
    use std::path::PathBuf;

    struct NullView;

    impl LibraryView for NullView {
        fn render_playlists(&self, _items: Vec<PlaylistItem>) {}
        fn render_songs(&self, _items: Vec<SongItem>) {}
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("core-service-test-{}", uuid::Uuid::new_v4()))
    }

    fn full_config(dir: &PathBuf) -> LibraryConfig {
        LibraryConfig::builder()
            .data_dir(dir)
            .file_system(Arc::new(TokioFileSystem::new()))
            .key_value_store(Arc::new(MemoryKeyValueStore::new()))
            .http_client(Arc::new(ReqwestHttpClient::new().unwrap()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_dependencies_require_every_bridge() {
        let config = LibraryConfig::builder()
            .data_dir("data")
            .file_system(Arc::new(TokioFileSystem::new()))
            .build()
            .unwrap();

        match ServiceDependencies::from_config(&config) {
            Err(CoreError::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient")
            }
            other => panic!("expected missing capability, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_open_library_seeds_from_server_documents() {
        let dir = scratch_dir();
        let config = full_config(&dir);
        let deps = ServiceDependencies::from_config(&config).unwrap();
        let core = CoreService::new(config, deps);

        core.songs()
            .replace_all(vec![Song::new(1, "Alpha", "Rock", "X")])
            .await
            .unwrap();

        let library = core.open_library(Arc::new(NullView)).await.unwrap();
        assert_eq!(library.songs().len(), 1);
        assert!(library.playlists().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_bootstrap_desktop_creates_directories() {
        let dir = scratch_dir();
        let config = LibraryConfig::builder()
            .data_dir(&dir)
            .key_value_store(Arc::new(MemoryKeyValueStore::new()))
            .build()
            .unwrap();

        let core = bootstrap_desktop(config).await.unwrap();
        assert!(core.config().assets_dir.exists());
        assert_eq!(core.playlist_editor().added_songs().len(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let dir = scratch_dir();
        let config = full_config(&dir);
        let deps = ServiceDependencies::from_config(&config).unwrap();
        let core = CoreService::new(config, deps);
        let mut events = core.event_bus().subscribe();

        core.songs()
            .replace_all(vec![Song::new(1, "Alpha", "Rock", "X")])
            .await
            .unwrap();
        core.songs().update_song_like(1).await.unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.description(), "Song like toggled");

        let _ = std::fs::remove_dir_all(dir);
    }
}
