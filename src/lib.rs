//! # Media Date Organizer
//!
//! Watches folders for new photos and videos and files a copy of each into
//! a dated library: `<output>/<YYYY>/<YYYY-MM-DD>/<original name>`.
//!
//! ## Core Philosophy
//! - **Never touch originals** - sources are only ever read
//! - **Never clobber** - a taken destination name means skip
//! - **Idempotent** - running again over the same files changes nothing
//!
//! ## Architecture
//! - `core` - Classification, date resolution, placement, scan and watch
//! - `config` - Configuration file loading
//! - `events` - Diagnostics sink handed to every component
//! - `error` - Error types

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{OrganizerError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the binary.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"`)
/// applies. Library code never calls this.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
