//! Video creation dates from the container's format-level tags.
//!
//! Probing shells out to `ffprobe -show_format` and reads
//! `format.tags.creation_time` from its JSON output.

use super::MetadataError;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

/// `%.f` accepts the fraction (`.000000`) as well as its absence.
const CREATION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Run ffprobe against `path` and return its `creation_time`
pub fn probe_creation_time(ffprobe: &Path, path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| MetadataError::Probe(format!("failed to run {}: {}", ffprobe.display(), e)))?;

    if !output.status.success() {
        return Err(MetadataError::Probe(format!(
            "{} exited with {}",
            ffprobe.display(),
            output.status
        )));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Extract `format.tags.creation_time` from ffprobe's JSON output
pub fn parse_probe_output(json: &str) -> Result<NaiveDateTime, MetadataError> {
    let probe: ProbeOutput =
        serde_json::from_str(json).map_err(|e| MetadataError::Probe(e.to_string()))?;

    let raw = probe
        .format
        .tags
        .get("creation_time")
        .ok_or(MetadataError::MissingTag("creation_time"))?;

    parse_creation_time(raw).ok_or_else(|| MetadataError::Unparsable(raw.clone()))
}

/// Parse a container timestamp (`2021-12-31T23:59:00.000000Z`)
pub fn parse_creation_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), CREATION_TIME_FORMAT).ok()
}
