//! # media-organizer CLI
//!
//! ## Usage
//! ```bash
//! media-organizer --config /app/config.json --scan-existing
//! media-organizer --config ./config.json --dry-run --verbose
//! ```

mod cli;

use media_date_organizer::Result;

fn main() -> Result<()> {
    cli::run()
}
