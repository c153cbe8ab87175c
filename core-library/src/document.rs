//! JSON document store
//!
//! Each backend collection lives in one JSON file that is rewritten whole on
//! every mutation. [`JsonDocument::update`] turns that rewrite into a
//! read-modify-write transaction: the whole sequence runs under an async
//! mutex, the new contents are written to a sibling `.tmp` file and renamed
//! over the original, and a revision counter is bumped per committed write.
//!
//! Writers in other processes are not coordinated; the last rename wins.

use crate::error::Result;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Decision returned by an update closure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<R> {
    /// Persist the mutated document and return the value
    Commit(R),
    /// Leave the file untouched and return the value
    Discard(R),
}

/// A typed JSON file guarded for in-process read-modify-write.
pub struct JsonDocument<T> {
    path: PathBuf,
    fs: Arc<dyn FileSystemAccess>,
    write_lock: Mutex<()>,
    revision: AtomicU64,
    _document: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            path: path.into(),
            fs,
            write_lock: Mutex::new(()),
            revision: AtomicU64::new(0),
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of writes committed through this handle
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Reads and parses the document. A missing file reads as the default.
    pub async fn read(&self) -> Result<T> {
        match self.fs.read_file(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.is_not_found() => {
                debug!(path = ?self.path, "Document missing, using empty default");
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Runs `mutate` against the current contents while holding the write lock.
    ///
    /// The file is rewritten only when the closure returns [`Change::Commit`].
    #[instrument(skip(self, mutate), fields(path = ?self.path))]
    pub async fn update<R, F>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Change<R>,
    {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read().await?;
        match mutate(&mut document) {
            Change::Commit(value) => {
                self.write_unlocked(&document).await?;
                Ok(value)
            }
            Change::Discard(value) => Ok(value),
        }
    }

    /// Replaces the whole document.
    pub async fn replace(&self, document: &T) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_unlocked(document).await
    }

    async fn write_unlocked(&self, document: &T) -> Result<()> {
        let contents = serde_json::to_vec_pretty(document)?;
        let staging = self.staging_path();

        self.fs.write_file(&staging, Bytes::from(contents)).await?;
        self.fs.rename(&staging, &self.path).await?;

        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(path = ?self.path, revision, "Document written");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<T> std::fmt::Debug for JsonDocument<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonDocument")
            .field("path", &self.path)
            .field("revision", &self.revision.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use crate::models::{Song, SongsDocument};
    use bridge_desktop::TokioFileSystem;
    use bridge_traits::error::BridgeError;
    use mockall::mock;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("document-test-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    fn document(path: &Path) -> JsonDocument<SongsDocument> {
        JsonDocument::new(path, Arc::new(TokioFileSystem::new()))
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_default() {
        let doc = document(&scratch_file("songs.json"));
        assert_eq!(doc.read().await.unwrap(), SongsDocument::default());
        assert_eq!(doc.revision(), 0);
    }

    #[tokio::test]
    async fn test_commit_writes_and_bumps_revision() {
        let path = scratch_file("songs.json");
        let doc = document(&path);

        let count = doc
            .update(|d| {
                d.songs.push(Song::new(1, "Alpha", "Rock", "X"));
                Change::Commit(d.songs.len())
            })
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(doc.revision(), 1);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"songs\""));
        assert!(!path.with_file_name("songs.json.tmp").exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_discard_leaves_file_untouched() {
        let path = scratch_file("songs.json");
        let doc = document(&path);

        let value = doc
            .update(|d| {
                d.songs.push(Song::new(1, "Alpha", "Rock", "X"));
                Change::Discard("skipped")
            })
            .await
            .unwrap();

        assert_eq!(value, "skipped");
        assert_eq!(doc.revision(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialised() {
        let path = scratch_file("songs.json");
        let doc = Arc::new(document(&path));
        doc.replace(&SongsDocument {
            songs: vec![Song::new(1, "Alpha", "Rock", "X")],
        })
        .await
        .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let doc = Arc::clone(&doc);
            handles.push(tokio::spawn(async move {
                doc.update(|d| {
                    d.songs[0].liked = !d.songs[0].liked;
                    Change::Commit(())
                })
                .await
                .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // An even number of inversions must land back on the original value
        assert!(!doc.read().await.unwrap().songs[0].liked);
        assert_eq!(doc.revision(), 21);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    mock! {
        FailingFs {}

        #[async_trait::async_trait]
        impl FileSystemAccess for FailingFs {
            async fn exists(&self, path: &Path) -> bridge_traits::error::Result<bool>;
            async fn create_dir_all(&self, path: &Path) -> bridge_traits::error::Result<()>;
            async fn read_file(&self, path: &Path) -> bridge_traits::error::Result<Bytes>;
            async fn write_file(&self, path: &Path, data: Bytes) -> bridge_traits::error::Result<()>;
            async fn rename(&self, from: &Path, to: &Path) -> bridge_traits::error::Result<()>;
            async fn delete_file(&self, path: &Path) -> bridge_traits::error::Result<()>;
        }
    }

    #[tokio::test]
    async fn test_write_failure_propagates_without_revision_bump() {
        let mut fs = MockFailingFs::new();
        fs.expect_read_file()
            .returning(|_| Ok(Bytes::from_static(br#"{"songs":[]}"#)));
        fs.expect_write_file()
            .returning(|_, _| Err(BridgeError::StorageError("disk full".to_string())));
        fs.expect_rename().never();

        let doc: JsonDocument<SongsDocument> = JsonDocument::new("songs.json", Arc::new(fs));
        let result = doc.update(|_| Change::Commit(())).await;

        assert!(matches!(result, Err(LibraryError::Bridge(_))));
        assert_eq!(doc.revision(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_serialization_error() {
        let mut fs = MockFailingFs::new();
        fs.expect_read_file()
            .returning(|_| Ok(Bytes::from_static(b"{not json")));

        let doc: JsonDocument<SongsDocument> = JsonDocument::new("songs.json", Arc::new(fs));
        assert!(matches!(
            doc.read().await,
            Err(LibraryError::Serialization(_))
        ));
    }
}
