//! # Classifier Module
//!
//! Maps a file's extension to a [`MediaKind`].
//!
//! ## Supported Formats
//! - Images: .jpg .jpeg .png .gif .bmp .tiff .heic .webp
//! - Videos: .mp4 .mov .avi .mkv .webm .mpg .m4v
//!
//! Matching is case-insensitive. Anything else, including files without an
//! extension, is [`MediaKind::Unsupported`].

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image extensions, lower-case, without the dot
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "heic", "webp"];

/// Video extensions, lower-case, without the dot
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "mpg", "m4v"];

/// What a file is, as far as organizing is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl MediaKind {
    /// Classify a bare extension (no leading dot)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unsupported
        }
    }

    /// Check if files of this kind get organized
    pub fn is_supported(&self) -> bool {
        !matches!(self, MediaKind::Unsupported)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Classify a path by its extension. Pure; never touches the disk.
pub fn classify(path: impl AsRef<Path>) -> MediaKind {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(MediaKind::from_extension)
        .unwrap_or(MediaKind::Unsupported)
}
