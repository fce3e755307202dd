//! # Metadata Module
//!
//! Reads the capture date embedded in a media file.
//!
//! ## Sources
//! - Images: EXIF `DateTimeOriginal`, then `DateTime` (`YYYY:MM:DD HH:MM:SS`)
//! - Videos: container-level `creation_time` tag as reported by ffprobe
//!   (`YYYY-MM-DDTHH:MM:SS.ffffffZ`)
//!
//! Every failure (unreadable container, missing tag, bad timestamp, ffprobe
//! not installed) degrades to `None`. Readers never retry.

mod image;
mod video;

pub use self::image::{parse_exif_datetime, read_exif_date};
pub use self::video::{parse_creation_time, parse_probe_output, probe_creation_time};

use crate::core::classifier::MediaKind;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Why no embedded date was found. Only ever logged.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable container: {0}")]
    Container(String),

    #[error("no {0} tag present")]
    MissingTag(&'static str),

    #[error("unparsable timestamp {0:?}")]
    Unparsable(String),

    #[error("ffprobe failed: {0}")]
    Probe(String),
}

/// Source of embedded capture dates.
///
/// Implement this trait to substitute the extractors (e.g., for testing).
pub trait MetadataReader: Send + Sync {
    /// Embedded capture date of an image, if any
    fn image_date(&self, path: &Path) -> Option<NaiveDateTime>;

    /// Embedded creation date of a video, if any
    fn video_date(&self, path: &Path) -> Option<NaiveDateTime>;

    /// Dispatch on media kind. Unsupported files have no embedded date.
    fn embedded_date(&self, path: &Path, kind: MediaKind) -> Option<NaiveDateTime> {
        match kind {
            MediaKind::Image => self.image_date(path),
            MediaKind::Video => self.video_date(path),
            MediaKind::Unsupported => None,
        }
    }
}

/// Production reader: kamadak-exif for images, an `ffprobe` binary for videos
#[derive(Debug, Clone)]
pub struct SystemMetadataReader {
    ffprobe: PathBuf,
}

impl SystemMetadataReader {
    /// Use `ffprobe` from `PATH`
    pub fn new() -> Self {
        Self::with_ffprobe("ffprobe")
    }

    /// Use a specific ffprobe executable
    pub fn with_ffprobe(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for SystemMetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataReader for SystemMetadataReader {
    fn image_date(&self, path: &Path) -> Option<NaiveDateTime> {
        match read_exif_date(path) {
            Ok(date) => Some(date),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No EXIF capture date");
                None
            }
        }
    }

    fn video_date(&self, path: &Path) -> Option<NaiveDateTime> {
        match probe_creation_time(&self.ffprobe, path) {
            Ok(date) => Some(date),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No video creation time");
                None
            }
        }
    }
}
