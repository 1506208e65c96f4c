//! Play-count rankings.

use crate::enrichment::EnrichedRow;
use crate::history::StreamEvent;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedItem {
    pub name: String,
    pub count: usize,
}

/// Counts occurrences of each name, then sorts by count descending with ties
/// broken by name ascending, and keeps the first `limit`.
pub fn rank_by_count<'a, I>(names: I, limit: usize) -> Vec<RankedItem>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut ranked: Vec<RankedItem> = counts
        .into_iter()
        .map(|(name, count)| RankedItem {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

/// Most played tracks, keyed by "artist - track".
pub fn top_songs(events: &[&StreamEvent], limit: usize) -> Vec<RankedItem> {
    rank_by_count(events.iter().map(|e| e.key.as_str()), limit)
}

pub fn top_artists(events: &[&StreamEvent], limit: usize) -> Vec<RankedItem> {
    rank_by_count(events.iter().map(|e| e.artist_name.as_str()), limit)
}

/// Genres by number of enriched rows. A stream of a track with several genres
/// counts once for each.
pub fn top_genres(rows: &[&EnrichedRow], limit: usize) -> Vec<RankedItem> {
    rank_by_count(rows.iter().map(|r| r.genre.as_str()), limit)
}
