//! End-to-end flows across the client store, the browser and the
//! file-backed managers.

use bridge_desktop::{SqliteKeyValueStore, TokioFileSystem};
use bridge_traits::storage::FileSystemAccess;
use core_library::thumbnail::encode_data_uri;
use core_library::{
    Library, LibraryView, PlaylistDraft, PlaylistItem, PlaylistsManager, SeedData, Song,
    SongItem, SongsManager, StorageManager, ThumbnailStore,
};
use core_runtime::events::EventBus;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

struct TempDir(PathBuf);

impl TempDir {
    fn new(prefix: &str) -> Self {
        Self(std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4())))
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[derive(Default)]
struct SongsOnlyView {
    songs: Mutex<Vec<SongItem>>,
}

impl LibraryView for SongsOnlyView {
    fn render_playlists(&self, _items: Vec<PlaylistItem>) {}

    fn render_songs(&self, items: Vec<SongItem>) {
        *self.songs.lock().unwrap() = items;
    }
}

fn catalogue() -> Vec<Song> {
    (1..=5)
        .map(|id| Song::new(id, format!("Track {}", id), "Rock", "Band"))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_like_toggles_are_not_lost() {
    let dir = TempDir::new("concurrent-likes");
    let manager = Arc::new(SongsManager::new(
        dir.0.join("songs.json"),
        Arc::new(TokioFileSystem::new()),
        EventBus::default(),
    ));
    manager.replace_all(catalogue()).await.unwrap();

    // Three toggles per song: every flag must end up inverted
    let mut handles = Vec::new();
    for _ in 0..3 {
        for id in 1..=5u32 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager.update_song_like(id).await.unwrap()
            }));
        }
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }

    let songs = manager.get_all_songs().await.unwrap();
    assert!(songs.iter().all(|song| song.liked));
    assert_eq!(manager.revision(), 1 + 15);
}

#[tokio::test]
async fn browser_over_sqlite_store_survives_reload() {
    let store = Arc::new(SqliteKeyValueStore::in_memory().await.unwrap());
    let bus = EventBus::default();
    let storage = Arc::new(StorageManager::new(store, bus.clone()));
    let seed = SeedData::new(Vec::new(), catalogue());

    let view = Arc::new(SongsOnlyView::default());
    let mut library = Library::new(storage.clone(), view.clone(), bus.clone());
    library.load(&seed).await.unwrap();
    library.toggle_like(3).await.unwrap();

    // A fresh page load must not reseed over the stored flag
    let mut reloaded = Library::new(storage, view.clone(), bus);
    reloaded.load(&seed).await.unwrap();

    let rendered = view.songs.lock().unwrap();
    let liked: Vec<u32> = rendered.iter().filter(|s| s.liked).map(|s| s.id).collect();
    assert_eq!(liked, vec![3]);
}

#[tokio::test]
async fn playlist_lifecycle_on_disk() {
    let dir = TempDir::new("playlist-lifecycle");
    let fs: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new());
    let manager = PlaylistsManager::new(
        dir.0.join("playlists.json"),
        ThumbnailStore::new(dir.0.join("assets").join("img"), fs.clone()),
        fs,
        EventBus::default(),
    );

    let mut ids = Vec::new();
    for name in ["Morning", "Workout", "Night"] {
        let playlist = manager
            .add_playlist(PlaylistDraft {
                name: name.to_string(),
                description: format!("{} mix", name),
                thumbnail: encode_data_uri(b"img", "image/webp"),
                songs: vec![1.into()],
            })
            .await
            .unwrap();
        ids.push(playlist.id);
    }

    assert!(manager.delete_playlist(&ids[0]).await.unwrap());

    let remaining: Vec<String> = manager
        .get_all_playlists()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(remaining, ids[1..].to_vec());

    let raw = std::fs::read_to_string(dir.0.join("playlists.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["playlists"].as_array().unwrap().len(), 2);
    assert!(!raw.contains("data:image"));
}
