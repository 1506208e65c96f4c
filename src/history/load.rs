//! Reads the user's listening and library exports.

use super::models::{LibraryEntry, StreamEvent};
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const LIBRARY_FILE_NAME: &str = "YourLibrary.json";
const STREAMING_HISTORY_PATTERN: &str = r"^StreamingHistory(\d+)\.json$";

#[derive(Deserialize)]
struct RawStreamRecord {
    #[serde(rename = "endTime")]
    end_time: String,
    #[serde(rename = "artistName")]
    artist_name: String,
    #[serde(rename = "trackName")]
    track_name: String,
    #[serde(rename = "msPlayed")]
    ms_played: i64,
}

#[derive(Deserialize)]
struct RawLibrary {
    tracks: Vec<RawLibraryTrack>,
}

#[derive(Deserialize)]
struct RawLibraryTrack {
    artist: String,
    track: String,
}

/// Finds `StreamingHistory<N>.json` partitions in `data_dir`, ordered by `N`.
pub fn discover_history_partitions(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = Regex::new(STREAMING_HISTORY_PATTERN)?;
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read data directory {:?}", data_dir))?;

    let mut partitions: Vec<(u64, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(captures) = file_name.to_str().and_then(|name| pattern.captures(name)) else {
            continue;
        };
        let Ok(number) = captures[1].parse::<u64>() else {
            continue;
        };
        partitions.push((number, entry.path()));
    }

    if partitions.is_empty() {
        bail!(
            "No StreamingHistory<N>.json files found in {:?}",
            data_dir
        );
    }

    partitions.sort_by_key(|(number, _)| *number);
    Ok(partitions.into_iter().map(|(_, path)| path).collect())
}

/// Reads a single listening-history partition.
pub fn read_history_partition(path: &Path) -> Result<Vec<StreamEvent>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let records: Vec<RawStreamRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse listening history {:?}", path))?;

    Ok(records
        .into_iter()
        .map(|r| StreamEvent::new(r.end_time, r.artist_name, r.track_name, r.ms_played))
        .collect())
}

/// Reads and concatenates the given partitions, in the order given.
pub fn read_streaming_history(paths: &[PathBuf]) -> Result<Vec<StreamEvent>> {
    let mut events = Vec::new();
    for path in paths {
        let mut partition = read_history_partition(path)?;
        debug!("Read {} stream events from {:?}", partition.len(), path);
        events.append(&mut partition);
    }
    Ok(events)
}

/// Discovers and reads every listening-history partition in `data_dir`.
pub fn load_streaming_history(data_dir: &Path) -> Result<Vec<StreamEvent>> {
    let partitions = discover_history_partitions(data_dir)?;
    let events = read_streaming_history(&partitions)?;
    info!(
        "Loaded {} stream events from {} partition(s)",
        events.len(),
        partitions.len()
    );
    Ok(events)
}

/// Reads the library export, keeping only its `tracks` collection.
pub fn read_library(path: &Path) -> Result<Vec<LibraryEntry>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let library: RawLibrary = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse library export {:?}", path))?;

    Ok(library
        .tracks
        .into_iter()
        .map(|t| LibraryEntry::new(t.artist, t.track))
        .collect())
}
