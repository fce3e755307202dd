//! Per-path settle window for watch events.
//!
//! A file that is still being written produces a burst of events. Paths
//! wait here until they have been quiet for the settle duration, so each
//! burst results in a single organize call on a complete file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Paths waiting to be organized, keyed to the instant they become due
#[derive(Debug)]
pub struct SettleQueue {
    settle: Duration,
    pending: HashMap<PathBuf, Instant>,
}

impl SettleQueue {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: HashMap::new(),
        }
    }

    /// Queue `path`, or restart its window if already queued
    pub fn push(&mut self, path: PathBuf, now: Instant) {
        self.pending.insert(path, now + self.settle);
    }

    /// Restart the window of an already-queued path. Unknown paths are ignored.
    pub fn touch(&mut self, path: &Path, now: Instant) {
        if let Some(due) = self.pending.get_mut(path) {
            *due = now + self.settle;
        }
    }

    /// Earliest instant at which something becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every path due at `now`, oldest first
    pub fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut due: Vec<(PathBuf, Instant)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, deadline)| (path.clone(), *deadline))
            .collect();
        due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        for (path, _) in &due {
            self.pending.remove(path);
        }
        due.into_iter().map(|(path, _)| path).collect()
    }

    /// Remove and return everything, oldest first
    pub fn drain(&mut self) -> Vec<PathBuf> {
        let mut all: Vec<(PathBuf, Instant)> = self.pending.drain().collect();
        all.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        all.into_iter().map(|(path, _)| path).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
