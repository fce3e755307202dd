//! Types for the organize module.

use crate::core::classifier::MediaKind;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a file's date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// EXIF tag or video container tag
    Metadata,
    /// Filesystem modification time (local time)
    ModifiedTime,
}

/// The canonical date of a file. Only year/month/day drive placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDate {
    pub datetime: NaiveDateTime,
    pub source: DateSource,
}

impl ResolvedDate {
    pub fn new(datetime: NaiveDateTime, source: DateSource) -> Self {
        Self { datetime, source }
    }

    /// Top-level bucket, e.g. `2022`
    pub fn year_folder(&self) -> String {
        self.datetime.year().to_string()
    }

    /// Leaf bucket, e.g. `2022-01-05`
    pub fn day_folder(&self) -> String {
        self.datetime.format("%Y-%m-%d").to_string()
    }
}

/// What to do with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementAction {
    Copy,
    SkipExists,
    SkipUnsupported,
    SkipNoDate,
}

/// Destination of a copy: `<output>/<YYYY>/<YYYY-MM-DD>/<original name>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub directory: PathBuf,
    pub path: PathBuf,
}

/// Placement decided for one file. Computed fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementDecision {
    pub action: PlacementAction,
    /// Absent for files that never got as far as planning
    pub destination: Option<Destination>,
}

impl PlacementDecision {
    pub fn unsupported() -> Self {
        Self {
            action: PlacementAction::SkipUnsupported,
            destination: None,
        }
    }

    pub fn no_date() -> Self {
        Self {
            action: PlacementAction::SkipNoDate,
            destination: None,
        }
    }

    pub fn destination_path(&self) -> Option<&PathBuf> {
        self.destination.as_ref().map(|d| &d.path)
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Library root
    pub output_root: PathBuf,
    /// Log intended copies without touching the disk
    pub dry_run: bool,
    /// Compare content when the destination name is already taken
    pub detect_conflicts: bool,
}

impl EngineConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            dry_run: false,
            detect_conflicts: false,
        }
    }
}

/// What actually happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Copied,
    WouldCopy,
    SkippedExists {
        /// Only ever true when conflict detection is enabled
        content_differs: bool,
    },
    SkippedUnsupported,
    SkippedNoDate,
}

/// Result of organizing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeOutcome {
    pub source: PathBuf,
    pub kind: MediaKind,
    pub date: Option<ResolvedDate>,
    /// The plan, as computed before any side effect
    pub decision: PlacementDecision,
    pub status: OutcomeStatus,
}
