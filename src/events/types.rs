//! Event type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Per-file placement outcomes
    Organize(OrganizeEvent),
    /// Bulk scan lifecycle
    Scan(ScanEvent),
    /// Watch subscription lifecycle
    Watcher(WatcherEvent),
}

/// Outcome of organizing one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// The file was copied into the library
    Copied {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Dry run: the file would have been copied
    WouldCopy {
        source: PathBuf,
        destination: PathBuf,
    },
    /// A file already occupies the destination path
    SkippedExists {
        source: PathBuf,
        destination: PathBuf,
        /// Only ever true when conflict detection is enabled
        content_differs: bool,
    },
    /// Extension is not in the supported table
    SkippedUnsupported { path: PathBuf },
    /// No date could be determined
    SkippedNoDate { path: PathBuf },
    /// Organizing the file failed; the enclosing loop keeps going
    Failed { path: PathBuf, message: String },
}

/// Events from a bulk scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scan of a root started
    Started { root: PathBuf },
    /// Scan of a root finished
    Completed { root: PathBuf, summary: ScanSummary },
}

/// Counters for one bulk scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Regular files handed to the engine
    pub files_seen: usize,
    pub copied: usize,
    pub would_copy: usize,
    pub skipped_existing: usize,
    pub skipped_unsupported: usize,
    pub skipped_no_date: usize,
    /// Files whose organize call failed, plus unreadable directory entries
    pub failed: usize,
}

impl ScanSummary {
    /// Count one organize outcome
    pub fn record(&mut self, event: &OrganizeEvent) {
        self.files_seen += 1;
        match event {
            OrganizeEvent::Copied { .. } => self.copied += 1,
            OrganizeEvent::WouldCopy { .. } => self.would_copy += 1,
            OrganizeEvent::SkippedExists { .. } => self.skipped_existing += 1,
            OrganizeEvent::SkippedUnsupported { .. } => self.skipped_unsupported += 1,
            OrganizeEvent::SkippedNoDate { .. } => self.skipped_no_date += 1,
            OrganizeEvent::Failed { .. } => self.failed += 1,
        }
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: &ScanSummary) {
        self.files_seen += other.files_seen;
        self.copied += other.copied;
        self.would_copy += other.would_copy;
        self.skipped_existing += other.skipped_existing;
        self.skipped_unsupported += other.skipped_unsupported;
        self.skipped_no_date += other.skipped_no_date;
        self.failed += other.failed;
    }
}

/// Kind of filesystem change that surfaced a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectedChange {
    Created,
    MovedIn,
}

/// Events from the watch coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WatcherEvent {
    /// Subscription to a root is live
    Started { path: PathBuf },
    /// Subscription to a root stopped and its worker quiesced
    Stopped { path: PathBuf },
    /// A created or moved-in file was accepted for organizing
    FileDetected { path: PathBuf, change: DetectedChange },
    /// The notification backend reported an error
    Error { message: String },
}
