//! The single-file organize pipeline:
//! classify, resolve date, plan, then copy or skip.

use super::conflict::contents_differ;
use super::planner::PlacementPlanner;
use super::resolver::DateResolver;
use super::types::*;
use crate::core::classifier::{classify, MediaKind};
use crate::core::metadata::MetadataReader;
use crate::error::OrganizeError;
use crate::events::{Event, EventSender, OrganizeEvent};
use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Organizes one file at a time.
///
/// Holds no state between calls; the destination tree is the only record
/// of what has been done. Safe to share across watch workers.
pub struct OrganizeEngine {
    config: EngineConfig,
    resolver: DateResolver,
    events: EventSender,
}

impl OrganizeEngine {
    pub fn new(config: EngineConfig, reader: Box<dyn MetadataReader>, events: EventSender) -> Self {
        Self {
            config,
            resolver: DateResolver::new(reader),
            events,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Organize `path`.
    ///
    /// Only ever adds a file under the output root. The source is never
    /// modified, and an existing destination is never overwritten. An `Err` means
    /// this one file could not be organized; it has already been logged and
    /// reported.
    pub fn organize(&self, path: &Path) -> Result<OrganizeOutcome, OrganizeError> {
        match self.organize_inner(path) {
            Ok(outcome) => {
                self.report(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error organizing file");
                self.events.send(Event::Organize(OrganizeEvent::Failed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    fn organize_inner(&self, path: &Path) -> Result<OrganizeOutcome, OrganizeError> {
        let kind = classify(path);
        let filename = match path.file_name() {
            Some(name) if kind.is_supported() => name,
            _ => return Ok(Self::unsupported(path, kind)),
        };

        // Opening a FIFO or device node can block forever; only regular files go on
        let metadata = fs::metadata(path).map_err(|source| OrganizeError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Ok(Self::unsupported(path, kind));
        }

        let date = match self.resolver.resolve(path, kind)? {
            Some(date) => date,
            None => {
                warn!(path = %path.display(), "Could not determine date, skipping");
                return Ok(Self::outcome(
                    path,
                    kind,
                    None,
                    PlacementDecision::no_date(),
                    OutcomeStatus::SkippedNoDate,
                ));
            }
        };

        let destination = PlacementPlanner::destination(&date, &self.config.output_root, filename);
        let planned = PlacementPlanner::decide(destination.clone());
        let (decision, status) = self.place(path, destination, planned.action)?;

        Ok(Self::outcome(path, kind, Some(date), decision, status))
    }

    /// Carry out a planned action.
    ///
    /// The returned decision reflects what was found at copy time, so a
    /// destination that appeared after planning turns `Copy` into `SkipExists`.
    fn place(
        &self,
        source: &Path,
        destination: Destination,
        planned: PlacementAction,
    ) -> Result<(PlacementDecision, OutcomeStatus), OrganizeError> {
        let mut action = planned;
        let status = match planned {
            PlacementAction::Copy if self.config.dry_run => {
                info!(
                    "DRY RUN: Would copy {} to {}",
                    source.display(),
                    destination.path.display()
                );
                OutcomeStatus::WouldCopy
            }
            PlacementAction::Copy => {
                if Self::materialize(source, &destination)? {
                    info!("Copied {} to {}", source.display(), destination.path.display());
                    OutcomeStatus::Copied
                } else {
                    // Lost a race with another organize call for the same path
                    action = PlacementAction::SkipExists;
                    self.skip_existing(source, &destination.path)
                }
            }
            _ => self.skip_existing(source, &destination.path),
        };

        let decision = PlacementDecision {
            action,
            destination: Some(destination),
        };
        Ok((decision, status))
    }

    fn unsupported(path: &Path, kind: MediaKind) -> OrganizeOutcome {
        debug!(path = %path.display(), "Skipping unsupported file");
        Self::outcome(
            path,
            kind,
            None,
            PlacementDecision::unsupported(),
            OutcomeStatus::SkippedUnsupported,
        )
    }

    fn skip_existing(&self, source: &Path, destination: &Path) -> OutcomeStatus {
        info!(
            "Skipping file as it already exists at destination: {}",
            destination.display()
        );

        let content_differs = self.config.detect_conflicts
            && match contents_differ(source, destination) {
                Ok(differs) => differs,
                Err(e) => {
                    debug!(path = %destination.display(), error = %e, "Could not compare content");
                    false
                }
            };

        if content_differs {
            warn!(
                "{} differs from {} which already holds its name; left both untouched",
                source.display(),
                destination.display()
            );
        }

        OutcomeStatus::SkippedExists { content_differs }
    }

    /// Copy `source` into place with create-exclusive semantics.
    ///
    /// Returns `Ok(false)` when the destination appeared since planning.
    fn materialize(source: &Path, destination: &Destination) -> Result<bool, OrganizeError> {
        if !destination.directory.is_dir() {
            fs::create_dir_all(&destination.directory).map_err(|source| {
                OrganizeError::CreateDirectory {
                    path: destination.directory.clone(),
                    source,
                }
            })?;
            debug!(path = %destination.directory.display(), "Created directory");
        }

        let mut target = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(OrganizeError::Copy {
                    source_path: source.to_path_buf(),
                    destination: destination.path.clone(),
                    source: e,
                })
            }
        };

        if let Err(e) = copy_contents(source, &mut target) {
            drop(target);
            // Only ever removes the file this call just created
            let _ = fs::remove_file(&destination.path);
            return Err(OrganizeError::Copy {
                source_path: source.to_path_buf(),
                destination: destination.path.clone(),
                source: e,
            });
        }
        drop(target);

        if let Err(e) = preserve_timestamps(source, &destination.path) {
            warn!(path = %destination.path.display(), error = %e, "Could not preserve timestamps");
        }

        Ok(true)
    }

    fn report(&self, outcome: &OrganizeOutcome) {
        let source = outcome.source.clone();
        let destination = outcome.decision.destination_path().cloned().unwrap_or_default();

        let event = match outcome.status {
            OutcomeStatus::Copied => OrganizeEvent::Copied {
                source,
                destination,
            },
            OutcomeStatus::WouldCopy => OrganizeEvent::WouldCopy {
                source,
                destination,
            },
            OutcomeStatus::SkippedExists { content_differs } => OrganizeEvent::SkippedExists {
                source,
                destination,
                content_differs,
            },
            OutcomeStatus::SkippedUnsupported => OrganizeEvent::SkippedUnsupported { path: source },
            OutcomeStatus::SkippedNoDate => OrganizeEvent::SkippedNoDate { path: source },
        };
        self.events.send(Event::Organize(event));
    }

    fn outcome(
        path: &Path,
        kind: MediaKind,
        date: Option<ResolvedDate>,
        decision: PlacementDecision,
        status: OutcomeStatus,
    ) -> OrganizeOutcome {
        OrganizeOutcome {
            source: path.to_path_buf(),
            kind,
            date,
            decision,
            status,
        }
    }
}

/// Stream bytes and permissions from `source` into the freshly created `target`
fn copy_contents(source: &Path, target: &mut File) -> io::Result<()> {
    let mut reader = File::open(source)?;
    io::copy(&mut reader, target)?;
    target.sync_all()?;
    target.set_permissions(reader.metadata()?.permissions())
}

/// Carry access and modification times over, like `cp -p`
fn preserve_timestamps(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{null_sender, EventChannel};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Reports the same date for every image and video
    struct StubReader(Option<NaiveDateTime>);

    impl MetadataReader for StubReader {
        fn image_date(&self, _path: &Path) -> Option<NaiveDateTime> {
            self.0
        }

        fn video_date(&self, _path: &Path) -> Option<NaiveDateTime> {
            self.0
        }
    }

    fn at(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(8, 30, 0)
    }

    fn engine(out: &Path, date: Option<NaiveDateTime>) -> OrganizeEngine {
        OrganizeEngine::new(
            EngineConfig::new(out),
            Box::new(StubReader(date)),
            null_sender(),
        )
    }

    fn source_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn copies_into_dated_folder() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "img1.jpg", b"jpeg bytes");
        filetime::set_file_mtime(&src, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

        let outcome = engine(out.path(), at(2022, 1, 5)).organize(&src).unwrap();

        let expected = out.path().join("2022/2022-01-05/img1.jpg");
        assert_eq!(outcome.status, OutcomeStatus::Copied);
        assert_eq!(outcome.decision.action, PlacementAction::Copy);
        assert_eq!(fs::read(&expected).unwrap(), b"jpeg bytes");
        assert_eq!(fs::read(&src).unwrap(), b"jpeg bytes");

        let copied = fs::metadata(&expected).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&copied),
            FileTime::from_unix_time(1_600_000_000, 0)
        );
    }

    #[test]
    fn existing_destination_is_never_clobbered() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "img1.jpg", b"new bytes");
        let day = out.path().join("2022/2022-01-05");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("img1.jpg"), b"original bytes").unwrap();

        let outcome = engine(out.path(), at(2022, 1, 5)).organize(&src).unwrap();

        assert_eq!(
            outcome.status,
            OutcomeStatus::SkippedExists {
                content_differs: false
            }
        );
        assert_eq!(fs::read(day.join("img1.jpg")).unwrap(), b"original bytes");
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "clip.mp4", b"video");
        let engine = engine(out.path(), at(2021, 12, 31));

        let first = engine.organize(&src).unwrap();
        let second = engine.organize(&src).unwrap();
        let third = engine.organize(&src).unwrap();

        assert_eq!(first.status, OutcomeStatus::Copied);
        assert_eq!(second.decision.action, PlacementAction::SkipExists);
        assert_eq!(second.decision, third.decision);
        assert_eq!(
            second.decision.destination_path(),
            Some(&out.path().join("2021/2021-12-31/clip.mp4"))
        );
    }

    #[test]
    fn dry_run_creates_nothing() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "img1.jpg", b"jpeg");
        let mut config = EngineConfig::new(out.path());
        config.dry_run = true;
        let engine =
            OrganizeEngine::new(config, Box::new(StubReader(at(2022, 1, 5))), null_sender());

        let outcome = engine.organize(&src).unwrap();

        assert_eq!(outcome.status, OutcomeStatus::WouldCopy);
        assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    }

    #[test]
    fn unsupported_extension_is_a_silent_noop() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "notes.txt", b"hello");

        let outcome = engine(out.path(), at(2022, 1, 5)).organize(&src).unwrap();

        assert_eq!(outcome.status, OutcomeStatus::SkippedUnsupported);
        assert_eq!(outcome.decision.action, PlacementAction::SkipUnsupported);
        assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    }

    #[test]
    fn directory_with_media_extension_is_skipped() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let dir = input.path().join("album.jpg");
        fs::create_dir(&dir).unwrap();

        let outcome = engine(out.path(), at(2022, 1, 5)).organize(&dir).unwrap();

        assert_eq!(outcome.status, OutcomeStatus::SkippedUnsupported);
    }

    #[test]
    fn vanished_file_fails_and_is_reported() {
        let out = TempDir::new().unwrap();
        let (sender, receiver) = EventChannel::new();
        let engine = OrganizeEngine::new(
            EngineConfig::new(out.path()),
            Box::new(StubReader(at(2022, 1, 5))),
            sender,
        );

        let result = engine.organize(Path::new("/nonexistent/img1.jpg"));

        assert!(matches!(result, Err(OrganizeError::SourceUnreadable { .. })));
        match receiver.try_recv() {
            Some(Event::Organize(OrganizeEvent::Failed { path, .. })) => {
                assert_eq!(path, PathBuf::from("/nonexistent/img1.jpg"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn copy_is_reported_with_destination() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "img1.jpg", b"jpeg");
        let (sender, receiver) = EventChannel::new();
        let engine = OrganizeEngine::new(
            EngineConfig::new(out.path()),
            Box::new(StubReader(at(2022, 1, 5))),
            sender,
        );

        engine.organize(&src).unwrap();

        match receiver.try_recv() {
            Some(Event::Organize(OrganizeEvent::Copied { destination, .. })) => {
                assert_eq!(destination, out.path().join("2022/2022-01-05/img1.jpg"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn conflict_detection_flags_different_content() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "IMG_0001.jpg", b"second camera");
        let day = out.path().join("2022/2022-01-05");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("IMG_0001.jpg"), b"first camera!").unwrap();

        let mut config = EngineConfig::new(out.path());
        config.detect_conflicts = true;
        let engine =
            OrganizeEngine::new(config, Box::new(StubReader(at(2022, 1, 5))), null_sender());

        let outcome = engine.organize(&src).unwrap();

        assert_eq!(
            outcome.status,
            OutcomeStatus::SkippedExists {
                content_differs: true
            }
        );
        assert_eq!(fs::read(day.join("IMG_0001.jpg")).unwrap(), b"first camera!");
    }

    #[test]
    fn conflict_detection_accepts_identical_content() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "img1.jpg", b"same");
        let mut config = EngineConfig::new(out.path());
        config.detect_conflicts = true;
        let engine =
            OrganizeEngine::new(config, Box::new(StubReader(at(2022, 1, 5))), null_sender());

        engine.organize(&src).unwrap();
        let outcome = engine.organize(&src).unwrap();

        assert_eq!(
            outcome.status,
            OutcomeStatus::SkippedExists {
                content_differs: false
            }
        );
    }

    #[test]
    fn materialize_refuses_existing_destination() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "img1.jpg", b"new");
        let destination = Destination {
            directory: out.path().to_path_buf(),
            path: out.path().join("img1.jpg"),
        };
        fs::write(&destination.path, b"old").unwrap();

        assert!(!OrganizeEngine::materialize(&src, &destination).unwrap());
        assert_eq!(fs::read(&destination.path).unwrap(), b"old");
    }

    #[test]
    fn destination_taken_after_planning_is_reported_as_skip() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = source_file(&input, "img1.jpg", b"late");
        let day = out.path().join("2022/2022-01-05");
        let destination = Destination {
            directory: day.clone(),
            path: day.join("img1.jpg"),
        };
        let planned = PlacementPlanner::decide(destination.clone());
        assert_eq!(planned.action, PlacementAction::Copy);

        // Another worker gets there first
        fs::create_dir_all(&day).unwrap();
        fs::write(&destination.path, b"first").unwrap();

        let (decision, status) = engine(out.path(), at(2022, 1, 5))
            .place(&src, destination, planned.action)
            .unwrap();

        assert_eq!(decision.action, PlacementAction::SkipExists);
        assert_eq!(decision.destination_path(), Some(&day.join("img1.jpg")));
        assert_eq!(
            status,
            OutcomeStatus::SkippedExists {
                content_differs: false
            }
        );
        assert_eq!(fs::read(day.join("img1.jpg")).unwrap(), b"first");
    }

    #[cfg(unix)]
    #[test]
    fn fifo_with_media_extension_is_skipped() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let fifo = input.path().join("pipe.jpg");
        let made = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(made.success());

        let outcome = engine(out.path(), at(2022, 1, 5)).organize(&fifo).unwrap();

        assert_eq!(outcome.status, OutcomeStatus::SkippedUnsupported);
        assert_eq!(outcome.decision.action, PlacementAction::SkipUnsupported);
        assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    }
}
