//! # Scanner Module
//!
//! Bulk pass over a watch root: every regular file below it is handed to
//! the [`OrganizeEngine`](crate::core::organize::OrganizeEngine).
//!
//! ## Example
//! ```rust,ignore
//! use media_date_organizer::core::scanner::DirectoryScanner;
//!
//! let scanner = DirectoryScanner::new(&engine, events.clone());
//! let report = scanner.scan("/photos/inbox")?;
//! println!("{} copied", report.summary.copied);
//! ```

mod walker;

pub use walker::{DirectoryScanner, ScanReport};
