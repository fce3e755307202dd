//! Date-based placement of media files.
//!
//! Files land at `<output>/<YYYY>/<YYYY-MM-DD>/<original name>`, dated by
//! embedded metadata with the modification time as fallback. A name that
//! is already taken at the destination is skipped, never overwritten.

mod conflict;
mod engine;
mod planner;
mod resolver;
mod types;

pub use conflict::contents_differ;
pub use engine::OrganizeEngine;
pub use planner::PlacementPlanner;
pub use resolver::DateResolver;
pub use types::*;
