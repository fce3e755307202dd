//! Date resolution: embedded metadata first, modification time second.

use super::types::{DateSource, ResolvedDate};
use crate::core::classifier::MediaKind;
use crate::core::metadata::MetadataReader;
use crate::error::OrganizeError;
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Picks the one authoritative date for a file
pub struct DateResolver {
    reader: Box<dyn MetadataReader>,
}

impl DateResolver {
    pub fn new(reader: Box<dyn MetadataReader>) -> Self {
        Self { reader }
    }

    /// Resolve the date of `path`.
    ///
    /// A file that cannot be opened (vanished, permission denied) is an
    /// error, never a missing date. `Ok(None)` only happens when the
    /// platform cannot report a modification time and no embedded date
    /// exists.
    pub fn resolve(
        &self,
        path: &Path,
        kind: MediaKind,
    ) -> Result<Option<ResolvedDate>, OrganizeError> {
        let unreadable = |source| OrganizeError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unreadable)?;
        let metadata = file.metadata().map_err(unreadable)?;
        drop(file);

        if let Some(datetime) = self.reader.embedded_date(path, kind) {
            debug!(path = %path.display(), date = %datetime, "Using embedded {} date", kind);
            return Ok(Some(ResolvedDate::new(datetime, DateSource::Metadata)));
        }

        match metadata.modified() {
            Ok(modified) => {
                let datetime = DateTime::<Local>::from(modified).naive_local();
                debug!(path = %path.display(), date = %datetime, "Using modification time");
                Ok(Some(ResolvedDate::new(datetime, DateSource::ModifiedTime)))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Modification time unavailable");
                Ok(None)
            }
        }
    }
}
