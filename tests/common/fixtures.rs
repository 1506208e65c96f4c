//! Test fixture creation: export files, the scenario catalog, log capture.
#![allow(dead_code)]

use super::constants::*;
use super::fake_catalog::FakeCatalog;
use listening_insights::catalog_client::TrackAttributes;
use listening_insights::history::{StreamEvent, LIBRARY_FILE_NAME};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

pub fn event(end_time: &str, artist_name: &str, track_name: &str, ms_played: i64) -> StreamEvent {
    StreamEvent::new(end_time, artist_name, track_name, ms_played)
}

/// A plays X twice around one B play. B has no genres.
pub fn scenario_events() -> Vec<StreamEvent> {
    vec![
        event("2021-01-01 10:00", ARTIST_A, TRACK_X, 180_000),
        event("2021-01-01 11:00", ARTIST_B, TRACK_Y, 200_000),
        event("2021-01-02 09:30", ARTIST_A, TRACK_X, 90_000),
    ]
}

pub fn scenario_catalog() -> FakeCatalog {
    FakeCatalog::new()
        .with_track(
            ARTIST_A,
            TRACK_X,
            TRACK_X_ID,
            TrackAttributes {
                energy: 0.8,
                loudness: -5.5,
                danceability: 0.6,
            },
            ARTIST_A_ID,
        )
        .with_track(
            ARTIST_B,
            TRACK_Y,
            TRACK_Y_ID,
            TrackAttributes {
                energy: 0.3,
                loudness: -12.0,
                danceability: 0.4,
            },
            ARTIST_B_ID,
        )
        .with_track(
            ARTIST_C,
            TRACK_Z,
            TRACK_Z_ID,
            TrackAttributes {
                energy: 0.5,
                loudness: -8.25,
                danceability: 0.7,
            },
            ARTIST_C_ID,
        )
        .with_artist(ARTIST_A_ID, &ARTIST_A_GENRES)
        .with_artist(ARTIST_B_ID, &[])
        .with_artist(ARTIST_C_ID, &ARTIST_C_GENRES)
}

/// A scratch data directory laid out like an unpacked export.
pub struct TestDataDir {
    dir: TempDir,
}

impl TestDataDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("audio_features")
    }
}

/// Writes `StreamingHistory<n>.json` in the export shape (no derived key).
pub fn write_history_partition(dir: &Path, n: usize, events: &[StreamEvent]) -> PathBuf {
    let records: Vec<serde_json::Value> = events
        .iter()
        .map(|e| {
            json!({
                "endTime": e.end_time,
                "artistName": e.artist_name,
                "trackName": e.track_name,
                "msPlayed": e.ms_played,
            })
        })
        .collect();
    let path = dir.join(format!("StreamingHistory{}.json", n));
    std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap())
        .expect("Failed to write history partition");
    path
}

/// Writes `YourLibrary.json` with the given (artist, track) pairs.
pub fn write_library(dir: &Path, tracks: &[(&str, &str)]) -> PathBuf {
    let tracks: Vec<serde_json::Value> = tracks
        .iter()
        .map(|(artist, track)| json!({ "artist": artist, "album": "Some Album", "track": track, "uri": "spotify:track:x" }))
        .collect();
    let library = json!({ "tracks": tracks, "albums": [], "shows": [] });
    let path = dir.join(LIBRARY_FILE_NAME);
    std::fs::write(&path, serde_json::to_string(&library).unwrap())
        .expect("Failed to write library");
    path
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with a subscriber that records every log line, and returns the
/// result together with the captured output.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}
