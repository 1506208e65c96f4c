//! Saved tracks that get skipped anyway.

use crate::history::{LibraryEntry, StreamEvent};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipThreshold {
    /// Skipped after about a second.
    #[default]
    Instant,
    /// Skipped within five seconds.
    Soon,
    /// Skipped after at least ten seconds.
    TenSeconds,
}

impl SkipThreshold {
    pub fn millis(self) -> f64 {
        match self {
            SkipThreshold::Instant => 1000.0,
            SkipThreshold::Soon => 5000.0,
            SkipThreshold::TenSeconds => 10000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikedTrack {
    pub key: String,
    pub plays: usize,
    pub mean_ms_played: f64,
}

/// Library tracks with the shortest mean play time.
///
/// Only streams of tracks in `library` count. Tracks whose mean play time is
/// not strictly above the threshold are dropped (those were never really
/// started). The rest are sorted by mean ascending and the first `limit` kept.
pub fn liked_but_skipped(
    events: &[&StreamEvent],
    library: &[LibraryEntry],
    threshold: SkipThreshold,
    limit: usize,
) -> Vec<LikedTrack> {
    let saved: HashSet<&str> = library.iter().map(|entry| entry.key.as_str()).collect();

    let mut totals: HashMap<&str, (usize, i64)> = HashMap::new();
    for event in events.iter().filter(|e| saved.contains(e.key.as_str())) {
        let total = totals.entry(event.key.as_str()).or_insert((0, 0));
        total.0 += 1;
        total.1 += event.ms_played;
    }

    let mut liked: Vec<LikedTrack> = totals
        .into_iter()
        .map(|(key, (plays, ms))| LikedTrack {
            key: key.to_string(),
            plays,
            mean_ms_played: ms as f64 / plays as f64,
        })
        .filter(|track| track.mean_ms_played > threshold.millis())
        .collect();

    liked.sort_by(|a, b| {
        a.mean_ms_played
            .total_cmp(&b.mean_ms_played)
            .then_with(|| a.key.cmp(&b.key))
    });
    liked.truncate(limit);
    liked
}
