//! # CLI Module
//!
//! Command-line interface for the media organizer.
//!
//! ## Usage
//! ```bash
//! # Watch the configured folders
//! media-organizer --config /app/config.json
//!
//! # File everything already there first
//! media-organizer --scan-existing
//!
//! # See what would happen without writing anything
//! media-organizer --scan-existing --dry-run --verbose
//! ```

use clap::Parser;
use console::{style, Term};
use media_date_organizer::config::{Config, DEFAULT_CONFIG_PATH};
use media_date_organizer::core::metadata::SystemMetadataReader;
use media_date_organizer::core::organize::{EngineConfig, OrganizeEngine};
use media_date_organizer::core::scanner::DirectoryScanner;
use media_date_organizer::core::watcher::{WatchCoordinator, WatcherConfig};
use media_date_organizer::error::{Result, WatchError};
use media_date_organizer::events::{Event, EventChannel, EventReceiver, ScanSummary};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

/// Media Organizer - file photos and videos by the day they were taken
#[derive(Parser, Debug)]
#[command(name = "media-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log what would be copied without creating any file or directory
    #[arg(long)]
    dry_run: bool,

    /// Organize files already in the watch directories before watching
    #[arg(long)]
    scan_existing: bool,

    /// Warn when a skipped file's name is taken by different content
    #[arg(long)]
    detect_conflicts: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    media_date_organizer::init_tracing(if cli.verbose { "debug" } else { "info" });

    let mut config = Config::load(&cli.config).map_err(|e| {
        error!("Error loading configuration: {}", e);
        e
    })?;
    if cli.detect_conflicts {
        config.detect_conflicts = true;
    }

    let term = Term::stderr();
    print_banner(&term, cli.dry_run);

    info!("Photo Organizer initialized with watch paths: {:?}", config.watch_paths);
    info!("Output path: {}", config.output_path.display());
    info!("Dry run mode: {}", cli.dry_run);

    let (sender, receiver) = EventChannel::new();
    let tally = spawn_tally(receiver);

    let engine = Arc::new(OrganizeEngine::new(
        EngineConfig {
            output_root: config.output_path.clone(),
            dry_run: cli.dry_run,
            detect_conflicts: config.detect_conflicts,
        },
        Box::new(SystemMetadataReader::new()),
        sender.clone(),
    ));

    if cli.scan_existing {
        info!("Scanning existing files in watch directories");
        let scanner = DirectoryScanner::new(&engine, sender.clone());
        let mut total = ScanSummary::default();
        for root in &config.watch_paths {
            match scanner.scan(root) {
                Ok(report) => total.merge(&report.summary),
                Err(e) => error!("{}", e),
            }
        }
        print_summary(&term, "Scan complete", &total);
    }

    let mut coordinator = WatchCoordinator::new(
        Arc::clone(&engine),
        WatcherConfig {
            settle: config.settle_duration(),
            ..WatcherConfig::default()
        },
        sender.clone(),
    );

    let mut last_error = None;
    for root in &config.watch_paths {
        if let Err(e) = coordinator.watch(root) {
            error!("{}", e);
            last_error = Some(e);
        }
    }
    if coordinator.watched_paths().is_empty() {
        return Err(last_error
            .unwrap_or_else(|| WatchError::InitFailed("no directory could be watched".into()))
            .into());
    }

    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| WatchError::InitFailed(format!("failed to install signal handler: {}", e)))?;

    info!("Photo Organizer is running. Press Ctrl+C to stop.");
    coordinator.run_until_shutdown(&shutdown_rx);
    info!("Stopping Photo Organizer");

    // Every sender must be gone before the tally thread can finish
    drop(coordinator);
    drop(engine);
    drop(sender);
    if let Ok(session) = tally.join() {
        print_summary(&term, "Session summary", &session);
    }

    Ok(())
}

/// Count every organize outcome reported during the session
fn spawn_tally(receiver: EventReceiver) -> thread::JoinHandle<ScanSummary> {
    thread::spawn(move || {
        let mut summary = ScanSummary::default();
        for event in receiver.iter() {
            if let Event::Organize(outcome) = event {
                summary.record(&outcome);
            }
        }
        summary
    })
}

fn print_banner(term: &Term, dry_run: bool) {
    term.write_line(&format!(
        "{} {}",
        style("Media Organizer").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    if dry_run {
        term.write_line(&format!(
            "  {}",
            style("Dry run: nothing will be written").yellow()
        ))
        .ok();
    }
    term.write_line("").ok();
}

fn print_summary(term: &Term, title: &str, summary: &ScanSummary) {
    term.write_line("").ok();
    term.write_line(&format!("{} {}", style("✓").green().bold(), title))
        .ok();
    term.write_line(&format!(
        "  {} files examined",
        style(summary.files_seen).cyan()
    ))
    .ok();
    term.write_line(&format!("  {} copied", style(summary.copied).cyan()))
        .ok();
    if summary.would_copy > 0 {
        term.write_line(&format!(
            "  {} would be copied",
            style(summary.would_copy).yellow()
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {} already in library",
        style(summary.skipped_existing).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} not photos or videos",
        style(summary.skipped_unsupported).dim()
    ))
    .ok();
    if summary.skipped_no_date > 0 {
        term.write_line(&format!(
            "  {} without a usable date",
            style(summary.skipped_no_date).yellow()
        ))
        .ok();
    }
    if summary.failed > 0 {
        term.write_line(&format!("  {} failed", style(summary.failed).red()))
            .ok();
    }
    term.write_line("").ok();
}
