//! # Core Module
//!
//! The organizing engine and its two entry points.
//!
//! ## Modules
//! - `classifier` - Maps extensions to image / video / unsupported
//! - `metadata` - Reads embedded capture dates (EXIF, video container tags)
//! - `organize` - Resolves dates, plans destinations, copies or skips
//! - `scanner` - Bulk pass over existing files
//! - `watcher` - Live organizing of new and moved-in files

pub mod classifier;
pub mod metadata;
pub mod organize;
pub mod scanner;
pub mod watcher;

// Re-export commonly used types
pub use classifier::{classify, MediaKind};
pub use metadata::{MetadataReader, SystemMetadataReader};
pub use organize::{
    EngineConfig, OrganizeEngine, OrganizeOutcome, OutcomeStatus, PlacementAction,
    PlacementDecision, ResolvedDate,
};
pub use scanner::{DirectoryScanner, ScanReport};
pub use watcher::{WatchCoordinator, WatcherConfig};
