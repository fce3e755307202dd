//! Directory walking implementation using walkdir.

use crate::core::organize::{OrganizeEngine, OutcomeStatus};
use crate::error::{OrganizerError, ScanError};
use crate::events::{Event, EventSender, ScanEvent, ScanSummary};
use std::path::Path;
use tracing::{error, info};
use walkdir::WalkDir;

/// Result of scanning one root
#[derive(Debug, Default)]
pub struct ScanReport {
    pub summary: ScanSummary,
    /// Per-file failures and unreadable entries; none of them stopped the walk
    pub errors: Vec<OrganizerError>,
}

/// Recursively feeds every file under a root to the engine
pub struct DirectoryScanner<'a> {
    engine: &'a OrganizeEngine,
    events: EventSender,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(engine: &'a OrganizeEngine, events: EventSender) -> Self {
        Self { engine, events }
    }

    /// Organize every regular file under `root`.
    ///
    /// Order is whatever walkdir yields. Directories are never organized;
    /// symlinks to files are (the target's bytes are copied) but symlinked
    /// directories are not descended into.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<ScanReport, ScanError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        info!("Processing directory: {}", root.display());
        self.events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut report = ScanReport::default();

        for entry_result in WalkDir::new(root).follow_links(false) {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    error!(path = %path.display(), error = %e, "Failed to read directory entry");
                    report.summary.failed += 1;
                    report.errors.push(
                        ScanError::ReadEntry {
                            path,
                            reason: e.to_string(),
                        }
                        .into(),
                    );
                    continue;
                }
            };

            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }

            report.summary.files_seen += 1;
            match self.engine.organize(entry.path()) {
                Ok(outcome) => match outcome.status {
                    OutcomeStatus::Copied => report.summary.copied += 1,
                    OutcomeStatus::WouldCopy => report.summary.would_copy += 1,
                    OutcomeStatus::SkippedExists { .. } => report.summary.skipped_existing += 1,
                    OutcomeStatus::SkippedUnsupported => report.summary.skipped_unsupported += 1,
                    OutcomeStatus::SkippedNoDate => report.summary.skipped_no_date += 1,
                },
                // Already logged by the engine
                Err(e) => {
                    report.summary.failed += 1;
                    report.errors.push(e.into());
                }
            }
        }

        self.events.send(Event::Scan(ScanEvent::Completed {
            root: root.to_path_buf(),
            summary: report.summary,
        }));

        Ok(report)
    }
}
