//! Data models for the enrichment pipeline.

use crate::catalog_client::{CatalogError, CatalogTrackId, TrackAttributes};
use crate::history::StreamEvent;
use serde::{Deserialize, Serialize};

/// One output row: a stream event joined with its track attributes and one
/// genre tag of its artist.
///
/// Field names follow the CSV header of the checkpoint and final files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    #[serde(rename = "endTime")]
    pub end_time: String,
    #[serde(rename = "artistName")]
    pub artist_name: String,
    #[serde(rename = "trackName")]
    pub track_name: String,
    #[serde(rename = "msPlayed")]
    pub ms_played: i64,
    #[serde(rename = "artist_and_song")]
    pub key: String,
    pub energy: f64,
    pub loudness: f64,
    pub danceability: f64,
    #[serde(rename = "genres")]
    pub genre: String,
}

/// Everything the catalog told us about one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEnrichment {
    pub track_id: CatalogTrackId,
    pub attributes: TrackAttributes,
    pub genres: Vec<String>,
}

impl TrackEnrichment {
    /// One row per genre tag. No genres means no rows.
    pub fn fan_out(&self, event: &StreamEvent) -> Vec<EnrichedRow> {
        self.genres
            .iter()
            .map(|genre| EnrichedRow {
                end_time: event.end_time.clone(),
                artist_name: event.artist_name.clone(),
                track_name: event.track_name.clone(),
                ms_played: event.ms_played,
                key: event.key.clone(),
                energy: self.attributes.energy,
                loudness: self.attributes.loudness,
                danceability: self.attributes.danceability,
                genre: genre.clone(),
            })
            .collect()
    }
}

/// Why a stream event produced no enrichment.
#[derive(Debug)]
pub enum SkipReason {
    /// The catalog answered the search with no usable match.
    NoMatch,
    /// A catalog call failed somewhere in the per-track sequence.
    Catalog(CatalogError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoMatch => f.write_str("no catalog match"),
            SkipReason::Catalog(e) => write!(f, "{}", e),
        }
    }
}

/// Outcome of resolving one stream event.
#[derive(Debug)]
pub enum TrackResolution {
    Resolved(TrackEnrichment),
    Skipped(SkipReason),
}

/// A stream event the pipeline gave up on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTrack {
    pub input_index: usize,
    pub artist_name: String,
    pub track_name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrichment(genres: &[&str]) -> TrackEnrichment {
        TrackEnrichment {
            track_id: CatalogTrackId::new("t1"),
            attributes: TrackAttributes {
                energy: 0.5,
                loudness: -7.0,
                danceability: 0.9,
            },
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn test_fan_out_one_row_per_genre() {
        let event = StreamEvent::new("2021-03-01 12:34", "A", "X", 1000);
        let rows = enrichment(&["pop", "rock", "indie"]).fan_out(&event);

        assert_eq!(rows.len(), 3);
        let genres: Vec<&str> = rows.iter().map(|r| r.genre.as_str()).collect();
        assert_eq!(genres, vec!["pop", "rock", "indie"]);
        for row in &rows {
            assert_eq!(row.key, "A - X");
            assert_eq!(row.end_time, "2021-03-01 12:34");
            assert_eq!(row.ms_played, 1000);
            assert_eq!(row.energy, 0.5);
            assert_eq!(row.loudness, -7.0);
            assert_eq!(row.danceability, 0.9);
        }
    }

    #[test]
    fn test_fan_out_without_genres_drops_event() {
        let event = StreamEvent::new("2021-03-01 12:34", "B", "Y", 1000);
        assert!(enrichment(&[]).fan_out(&event).is_empty());
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NoMatch.to_string(), "no catalog match");
        assert_eq!(
            SkipReason::Catalog(CatalogError::Timeout).to_string(),
            "Request timeout"
        );
    }
}
