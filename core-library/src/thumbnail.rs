//! Playlist thumbnail storage
//!
//! Uploaded thumbnails arrive as `data:<mime>;base64,<payload>` URIs. The
//! store decodes them into `<assets_dir>/<playlist_id>.<ext>` and hands back
//! the server reference `assets/img/<playlist_id>.<ext>` that is kept in the
//! playlist record and served statically.

use crate::error::{LibraryError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_runtime::logging::strip_path;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// URL prefix under which stored thumbnails are served
pub const THUMBNAIL_URL_PREFIX: &str = "assets/img";

/// A decoded `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub data: Vec<u8>,
}

impl DataUri {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Parses `data:<mime>;base64,<payload>`.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| LibraryError::Thumbnail("Not a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| LibraryError::Thumbnail("Data URI has no payload".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| LibraryError::Thumbnail("Only base64 data URIs are supported".to_string()))?;

        if mime.is_empty() {
            return Err(LibraryError::Thumbnail("Data URI has no media type".to_string()));
        }

        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| LibraryError::Thumbnail(format!("Invalid base64 payload: {}", e)))?;

        Ok(Self::new(mime, data))
    }

    /// Encodes back into `data:<mime>;base64,<payload>`.
    pub fn encode(&self) -> String {
        encode_data_uri(&self.data, &self.mime)
    }

    /// File extension for the media type
    pub fn extension(&self) -> Result<&'static str> {
        extension_for_mime(&self.mime)
    }
}

/// Whether a thumbnail value is an inline data URI rather than a reference.
pub fn is_data_uri(value: &str) -> bool {
    value.starts_with("data:")
}

/// Encodes raw image bytes as a data URI.
pub fn encode_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

fn extension_for_mime(mime: &str) -> Result<&'static str> {
    match mime.to_ascii_lowercase().as_str() {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        "image/svg+xml" => Ok("svg"),
        "image/bmp" => Ok("bmp"),
        other => Err(LibraryError::Thumbnail(format!(
            "Unsupported image type '{}'",
            other
        ))),
    }
}

/// File-backed thumbnail store rooted at the assets directory.
pub struct ThumbnailStore {
    fs: Arc<dyn FileSystemAccess>,
    assets_dir: PathBuf,
}

impl ThumbnailStore {
    pub fn new(assets_dir: impl Into<PathBuf>, fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            fs,
            assets_dir: assets_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Writes the image for `playlist_id` and returns its server reference.
    pub async fn save(&self, playlist_id: &str, image: &DataUri) -> Result<String> {
        validate_file_stem(playlist_id)?;
        let file_name = format!("{}.{}", playlist_id, image.extension()?);

        self.fs.create_dir_all(&self.assets_dir).await?;
        self.fs
            .write_file(&self.assets_dir.join(&file_name), Bytes::from(image.data.clone()))
            .await?;

        info!(playlist_id, file = %file_name, size = image.data.len(), "Stored thumbnail");
        Ok(format!("{}/{}", THUMBNAIL_URL_PREFIX, file_name))
    }

    /// Normalises a thumbnail value for storage.
    ///
    /// Data URIs are written to disk and replaced by their reference. Any
    /// other value must be a reference to this playlist's own file
    /// (`assets/img/<playlist_id>.<ext>`).
    ///
    /// # Errors
    ///
    /// [`LibraryError::InvalidInput`] for a reference owned by another
    /// playlist or outside the assets directory.
    pub async fn store(&self, playlist_id: &str, thumbnail: &str) -> Result<String> {
        if is_data_uri(thumbnail) {
            let image = DataUri::parse(thumbnail)?;
            return self.save(playlist_id, &image).await;
        }

        match reference_file_name(thumbnail) {
            Some(file_name) if is_owned_by(file_name, playlist_id) => {
                Ok(format!("{}/{}", THUMBNAIL_URL_PREFIX, file_name))
            }
            _ => Err(LibraryError::invalid(
                "thumbnail",
                format!("'{}' is not a thumbnail of playlist {}", thumbnail, playlist_id),
            )),
        }
    }

    /// Resolves a server reference to its file, or `None` for foreign values.
    pub fn path_for_reference(&self, reference: &str) -> Option<PathBuf> {
        reference_file_name(reference).map(|file_name| self.assets_dir.join(file_name))
    }

    /// Reads a stored thumbnail back as bytes.
    pub async fn load(&self, reference: &str) -> Result<Option<Bytes>> {
        let Some(path) = self.path_for_reference(reference) else {
            return Ok(None);
        };
        match self.fs.read_file(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the stored thumbnail of `playlist_id`.
    ///
    /// Missing files, foreign values and files named after another playlist
    /// are left alone. Returns whether a file was deleted.
    pub async fn delete(&self, playlist_id: &str, reference: &str) -> Result<bool> {
        let Some(file_name) = reference_file_name(reference) else {
            return Ok(false);
        };
        if !is_owned_by(file_name, playlist_id) {
            warn!(playlist_id, file = file_name, "Refusing to delete foreign thumbnail");
            return Ok(false);
        }

        match self.fs.delete_file(&self.assets_dir.join(file_name)).await {
            Ok(()) => {
                debug!(file = %strip_path(reference), "Deleted thumbnail");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn reference_file_name(reference: &str) -> Option<&str> {
    let file_name = reference
        .trim_start_matches("./")
        .trim_start_matches('/')
        .strip_prefix(THUMBNAIL_URL_PREFIX)?
        .strip_prefix('/')?;
    validate_file_stem(file_name).ok()?;
    Some(file_name)
}

// `<playlist_id>.<ext>` with a single non-empty extension
fn is_owned_by(file_name: &str, playlist_id: &str) -> bool {
    file_name
        .strip_prefix(playlist_id)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|ext| !ext.is_empty() && !ext.contains('.'))
}

// Single plain path segment: no separators, no parent/current dir tricks
fn validate_file_stem(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains('\\') => Ok(()),
        _ => Err(LibraryError::invalid(
            "thumbnail",
            format!("'{}' is not a plain file name", name),
        )),
    }
}
