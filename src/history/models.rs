//! Data models for the listening export.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format used by the listening export (`endTime`).
pub const END_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses an `endTime` value. Returns `None` for values that don't follow the export format.
pub fn parse_end_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, END_TIME_FORMAT).ok()
}

/// Builds the stable per-track key shared by every table in the crate.
pub fn track_key(artist_name: &str, track_name: &str) -> String {
    format!("{} - {}", artist_name, track_name)
}

/// One historical playback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "endTime")]
    pub end_time: String,
    #[serde(rename = "artistName")]
    pub artist_name: String,
    #[serde(rename = "trackName")]
    pub track_name: String,
    #[serde(rename = "msPlayed")]
    pub ms_played: i64,
    /// Derived key, see [`track_key`].
    #[serde(rename = "artist_and_song")]
    pub key: String,
}

impl StreamEvent {
    pub fn new(
        end_time: impl Into<String>,
        artist_name: impl Into<String>,
        track_name: impl Into<String>,
        ms_played: i64,
    ) -> Self {
        let artist_name = artist_name.into();
        let track_name = track_name.into();
        let key = track_key(&artist_name, &track_name);
        Self {
            end_time: end_time.into(),
            artist_name,
            track_name,
            ms_played,
            key,
        }
    }

    pub fn end_time_parsed(&self) -> Option<NaiveDateTime> {
        parse_end_time(&self.end_time)
    }
}

/// A track the user saved to their library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub artist_name: String,
    pub track_name: String,
    pub key: String,
}

impl LibraryEntry {
    pub fn new(artist_name: impl Into<String>, track_name: impl Into<String>) -> Self {
        let artist_name = artist_name.into();
        let track_name = track_name.into();
        let key = track_key(&artist_name, &track_name);
        Self {
            artist_name,
            track_name,
            key,
        }
    }
}
