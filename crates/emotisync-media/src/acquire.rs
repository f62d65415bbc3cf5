//! Media acquisition — obtaining a single image or video for recognition.

use emotisync_core::{MediaAsset, MediaKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where an asset may be obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSource {
    Album,
    Camera,
}

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("selection cancelled")]
    Cancelled,
    #[error("platform denied access: {0}")]
    PlatformDenied(String),
    #[error("selected file unreadable: {0}")]
    Unreadable(String),
}

/// Picker seam: yields exactly one asset or an acquisition failure.
///
/// The upload size ceiling is pipeline policy and belongs to the caller;
/// acquirers only report what the device handed over.
pub trait MediaAcquirer {
    async fn acquire(
        &self,
        kinds: &[MediaKind],
        sources: &[MediaSource],
    ) -> Result<MediaAsset, AcquireError>;
}

/// Filesystem-backed acquirer: the CLI's "album" is a user-supplied path.
pub struct FileAcquirer {
    path: PathBuf,
}

impl FileAcquirer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MediaAcquirer for FileAcquirer {
    async fn acquire(
        &self,
        kinds: &[MediaKind],
        _sources: &[MediaSource],
    ) -> Result<MediaAsset, AcquireError> {
        if self.path.as_os_str().is_empty() {
            return Err(AcquireError::Cancelled);
        }

        let (kind, mime_type) = classify_extension(&self.path);

        // A kind the picker was not asked for behaves like a dismissed
        // picker: there is nothing valid to select.
        if !kinds.contains(&kind) {
            tracing::warn!(
                path = %self.path.display(),
                ?kind,
                "file kind not among requested media kinds"
            );
            return Err(AcquireError::Cancelled);
        }

        let metadata = tokio::fs::metadata(&self.path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::PermissionDenied {
                AcquireError::PlatformDenied(self.path.display().to_string())
            } else {
                AcquireError::Unreadable(format!("{}: {err}", self.path.display()))
            }
        })?;

        Ok(MediaAsset {
            local_path: self.path.clone(),
            kind,
            size_bytes: metadata.len(),
            mime_type,
        })
    }
}

/// Infer media kind and MIME type from the file extension.
fn classify_extension(path: &Path) -> (MediaKind, String) {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let (kind, mime) = match extension.as_deref() {
        Some("jpg" | "jpeg") => (MediaKind::Image, "image/jpeg"),
        Some("png") => (MediaKind::Image, "image/png"),
        Some("gif") => (MediaKind::Image, "image/gif"),
        Some("webp") => (MediaKind::Image, "image/webp"),
        Some("bmp") => (MediaKind::Image, "image/bmp"),
        Some("mp4") => (MediaKind::Video, "video/mp4"),
        Some("mov") => (MediaKind::Video, "video/quicktime"),
        Some("avi") => (MediaKind::Video, "video/x-msvideo"),
        // Unknown extensions are treated as still images; the service
        // rejects anything it cannot decode.
        _ => (MediaKind::Image, "image/png"),
    };
    (kind, mime.to_string())
}
