//! # Error Module
//!
//! Error types for the media organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file isolation** - an `OrganizeError` only ever describes one file
//! - **Fatal only at startup** - configuration errors stop the process,
//!   nothing else does

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Organize error: {0}")]
    Organize(#[from] OrganizeError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),
}

/// Errors raised while loading the configuration file.
///
/// All of these are fatal: no watcher is started once one occurs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No watch paths configured. Add at least one directory to \"watch_paths\".")]
    MissingWatchPaths,

    #[error("No output path configured. Set \"output_path\" to the library root.")]
    MissingOutputPath,
}

/// Errors that abort organizing a single file
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Cannot access source file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {source_path} to {destination}: {source}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OrganizeError {
    /// The file this error is about
    pub fn path(&self) -> &PathBuf {
        match self {
            OrganizeError::SourceUnreadable { path, .. } => path,
            OrganizeError::CreateDirectory { path, .. } => path,
            OrganizeError::Copy { source_path, .. } => source_path,
        }
    }
}

/// Errors that occur while walking a watch root
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read {path}: {reason}")]
    ReadEntry { path: PathBuf, reason: String },
}

/// Errors that occur while subscribing to filesystem changes
#[derive(Error, Debug, Clone)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {0}")]
    InitFailed(String),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to watch {}: {reason}", path.display())]
    WatchFailed { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;
