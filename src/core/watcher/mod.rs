//! # Watcher Module
//!
//! Organizes files as they appear in the watch roots.
//!
//! ## Features
//! - One notify subscription per root, recursive by default
//! - Each root gets its own channel and worker thread, so roots never block
//!   one another
//! - Created files and files moved *into* a root are organized; the origin
//!   of a move is ignored
//! - A directory created in or moved into a root has its files organized,
//!   never the directory itself
//! - Bursts of events for one path settle into a single organize call
//! - Shutdown stops every subscription and waits for in-flight work
//!
//! ## Example
//! ```rust,ignore
//! use media_date_organizer::core::watcher::{WatchCoordinator, WatcherConfig};
//!
//! let mut coordinator = WatchCoordinator::new(engine, WatcherConfig::default(), events);
//! coordinator.watch("/photos/inbox")?;
//! coordinator.run_until_shutdown(&shutdown_rx);
//! ```

mod settle;

pub use settle::SettleQueue;

use crate::core::organize::OrganizeEngine;
use crate::error::WatchError;
use crate::events::{DetectedChange, Event as OrganizerEvent, EventSender, WatcherEvent};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Configuration for the watch coordinator
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Quiet period before a detected file is organized
    pub settle: Duration,
    /// Whether to watch subdirectories recursively
    pub recursive: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            recursive: true,
        }
    }
}

/// A filesystem change relevant to organizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// Something was created at this path
    Created(PathBuf),
    /// Something was moved or renamed to this path
    MovedIn(PathBuf),
    /// A rename the backend could not pair up; the path may be either end
    Renamed(PathBuf),
    /// Content was written at this path
    Written(PathBuf),
}

/// Translate a notify event into the change it represents, if any.
///
/// Pure: whether the path is a directory is checked later, by the worker,
/// which queues the files inside one instead of the directory itself.
pub fn interpret(event: &Event) -> Option<FileChange> {
    let first = || event.paths.first().cloned();

    match event.kind {
        EventKind::Create(_) => first().map(FileChange::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => first().map(FileChange::MovedIn),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.get(1).cloned().map(FileChange::MovedIn)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => first().map(FileChange::Renamed),
        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Access(AccessKind::Close(AccessMode::Write)) => {
            first().map(FileChange::Written)
        }
        _ => None,
    }
}

/// Drains one root's event channel into the engine
struct RootWorker {
    root: PathBuf,
    engine: Arc<OrganizeEngine>,
    events: EventSender,
    queue: SettleQueue,
}

impl RootWorker {
    fn run(mut self, rx: Receiver<notify::Result<Event>>) {
        loop {
            let message = match self.queue.next_deadline() {
                Some(deadline) => rx.recv_deadline(deadline),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match message {
                Ok(Ok(event)) => {
                    if let Some(change) = interpret(&event) {
                        self.accept(change, Instant::now());
                    }
                }
                Ok(Err(e)) => {
                    warn!(root = %self.root.display(), error = %e, "Watch error");
                    self.events.send(OrganizerEvent::Watcher(WatcherEvent::Error {
                        message: e.to_string(),
                    }));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            for path in self.queue.take_due(Instant::now()) {
                self.organize(&path);
            }
        }

        // Subscription is gone; finish what was already accepted
        for path in self.queue.drain() {
            self.organize(&path);
        }
    }

    fn accept(&mut self, change: FileChange, now: Instant) {
        let (path, detected) = match change {
            FileChange::Written(path) => {
                self.queue.touch(&path, now);
                return;
            }
            FileChange::Created(path) => (path, DetectedChange::Created),
            FileChange::MovedIn(path) => (path, DetectedChange::MovedIn),
            FileChange::Renamed(path) if path.exists() => (path, DetectedChange::MovedIn),
            FileChange::Renamed(_) => return,
        };

        if path.is_dir() {
            // A directory arriving whole raises no events for what it already holds
            debug!("Directory arrived: {}", path.display());
            for file in files_under(&path) {
                self.enqueue(file, detected, now);
            }
            return;
        }

        self.enqueue(path, detected, now);
    }

    fn enqueue(&mut self, path: PathBuf, detected: DetectedChange, now: Instant) {
        match detected {
            DetectedChange::Created => debug!("File created: {}", path.display()),
            DetectedChange::MovedIn => debug!("File moved: {}", path.display()),
        }
        self.events.send(OrganizerEvent::Watcher(WatcherEvent::FileDetected {
            path: path.clone(),
            change: detected,
        }));
        self.queue.push(path, now);
    }

    fn organize(&self, path: &Path) {
        // Failures are logged and reported by the engine; the loop carries on
        let _ = self.engine.organize(path);
    }
}

/// Regular files anywhere under `dir`, the directory itself excluded
fn files_under(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to read directory entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect()
}

/// One live subscription
struct Subscription {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
    worker: Option<JoinHandle<()>>,
}

/// Watches every configured root and feeds new files to the engine
pub struct WatchCoordinator {
    engine: Arc<OrganizeEngine>,
    config: WatcherConfig,
    events: EventSender,
    subscriptions: Vec<Subscription>,
}

impl WatchCoordinator {
    pub fn new(engine: Arc<OrganizeEngine>, config: WatcherConfig, events: EventSender) -> Self {
        Self {
            engine,
            config,
            events,
            subscriptions: Vec::new(),
        }
    }

    /// Start watching `root`
    pub fn watch(&mut self, root: impl AsRef<Path>) -> Result<(), WatchError> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(WatchError::PathNotFound(root));
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let _ = tx.send(result);
        })
        .map_err(|e| WatchError::InitFailed(e.to_string()))?;

        let mode = if self.config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        watcher
            .watch(&root, mode)
            .map_err(|e| WatchError::WatchFailed {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        let worker = RootWorker {
            root: root.clone(),
            engine: Arc::clone(&self.engine),
            events: self.events.clone(),
            queue: SettleQueue::new(self.config.settle),
        };
        let handle = thread::Builder::new()
            .name("watch-worker".to_string())
            .spawn(move || worker.run(rx))
            .map_err(|e| WatchError::InitFailed(e.to_string()))?;

        info!("Started watching directory: {}", root.display());
        self.events
            .send(OrganizerEvent::Watcher(WatcherEvent::Started { path: root.clone() }));

        self.subscriptions.push(Subscription {
            root,
            watcher: Some(watcher),
            worker: Some(handle),
        });

        Ok(())
    }

    /// Get list of currently watched roots
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.subscriptions.iter().map(|s| s.root.clone()).collect()
    }

    /// Check if a root is being watched
    pub fn is_watching(&self, path: impl AsRef<Path>) -> bool {
        self.subscriptions.iter().any(|s| s.root == path.as_ref())
    }

    /// Block until `shutdown` fires (or its sender is dropped), then stop
    pub fn run_until_shutdown(&mut self, shutdown: &Receiver<()>) {
        let _ = shutdown.recv();
        self.shutdown();
    }

    /// Stop every subscription and wait for its worker to finish.
    ///
    /// Paths already accepted are still organized; nothing new is accepted.
    pub fn shutdown(&mut self) {
        for mut subscription in self.subscriptions.drain(..) {
            // Dropping the watcher closes the channel feeding the worker
            drop(subscription.watcher.take());
            if let Some(worker) = subscription.worker.take() {
                if worker.join().is_err() {
                    warn!(root = %subscription.root.display(), "Watch worker panicked");
                }
            }

            info!("Stopped watching directory: {}", subscription.root.display());
            self.events.send(OrganizerEvent::Watcher(WatcherEvent::Stopped {
                path: subscription.root,
            }));
        }
    }
}

impl Drop for WatchCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
