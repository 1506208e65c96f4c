//! Aggregations over the listening history and the enriched table.

mod rankings;
mod season;
mod taste;
mod time_of_day;
mod trends;

pub use rankings::{rank_by_count, top_artists, top_genres, top_songs, RankedItem};
pub use season::{filter_by_season, Season, Timestamped};
pub use taste::{liked_but_skipped, LikedTrack, SkipThreshold};
pub use time_of_day::{listening_pattern, TimeSlot, SLOTS_PER_DAY};
pub use trends::{attribute_trends, min_max_normalize, Granularity, TrendPoint};

use crate::enrichment::EnrichedRow;
use crate::history::{LibraryEntry, StreamEvent};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub season: Season,
    pub top_n: usize,
    pub genre_slices: usize,
    pub liked_limit: usize,
    pub skip_threshold: SkipThreshold,
    pub granularity: Granularity,
    pub utc_offset_hours: i32,
    pub current_year: i32,
}

/// Every aggregate of one report, ready for printing or JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub season: Season,
    pub streams: usize,
    pub enriched_rows: usize,
    pub top_songs: Vec<RankedItem>,
    pub top_artists: Vec<RankedItem>,
    pub top_genres: Vec<RankedItem>,
    pub listening_pattern: Vec<TimeSlot>,
    pub granularity: Granularity,
    pub trends: Vec<TrendPoint>,
    pub skip_threshold: SkipThreshold,
    pub liked_but_skipped: Vec<LikedTrack>,
}

/// Applies the season filter to both tables and computes every aggregate.
pub fn build_report(
    events: &[StreamEvent],
    library: &[LibraryEntry],
    rows: &[EnrichedRow],
    options: &ReportOptions,
) -> DashboardReport {
    let events = filter_by_season(events, options.season);
    let rows = filter_by_season(rows, options.season);

    DashboardReport {
        season: options.season,
        streams: events.len(),
        enriched_rows: rows.len(),
        top_songs: top_songs(&events, options.top_n),
        top_artists: top_artists(&events, options.top_n),
        top_genres: top_genres(&rows, options.genre_slices),
        listening_pattern: listening_pattern(&events, options.utc_offset_hours),
        granularity: options.granularity,
        trends: attribute_trends(
            &rows,
            options.granularity,
            options.season,
            options.current_year,
        ),
        skip_threshold: options.skip_threshold,
        liked_but_skipped: liked_but_skipped(
            &events,
            library,
            options.skip_threshold,
            options.liked_limit,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(season: Season) -> ReportOptions {
        ReportOptions {
            season,
            top_n: 10,
            genre_slices: 20,
            liked_limit: 20,
            skip_threshold: SkipThreshold::Instant,
            granularity: Granularity::Monthly,
            utc_offset_hours: 0,
            current_year: 2030,
        }
    }

    fn row(end_time: &str, genre: &str) -> EnrichedRow {
        EnrichedRow {
            end_time: end_time.to_string(),
            artist_name: "A".to_string(),
            track_name: "X".to_string(),
            ms_played: 3000,
            key: "A - X".to_string(),
            energy: 0.5,
            loudness: -5.0,
            danceability: 0.5,
            genre: genre.to_string(),
        }
    }

    #[test]
    fn test_report_applies_season_to_both_tables() {
        let events = vec![
            StreamEvent::new("2021-07-01 10:00", "A", "X", 3000),
            StreamEvent::new("2021-01-01 10:00", "B", "Y", 3000),
        ];
        let rows = vec![
            row("2021-07-01 10:00", "pop"),
            row("2021-07-01 10:00", "rock"),
            row("2021-01-01 10:00", "jazz"),
        ];
        let library = vec![LibraryEntry::new("A", "X")];

        let report = build_report(&events, &library, &rows, &options(Season::Summer));

        assert_eq!(report.streams, 1);
        assert_eq!(report.enriched_rows, 2);
        assert_eq!(report.top_artists[0].name, "A");
        let genres: Vec<&str> = report.top_genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(genres, vec!["pop", "rock"]);
        assert_eq!(report.listening_pattern.len(), SLOTS_PER_DAY);
        assert_eq!(report.trends.len(), 1);
        assert_eq!(report.liked_but_skipped.len(), 1);
    }

    #[test]
    fn test_report_serializes() {
        let report = build_report(&[], &[], &[], &options(Season::All));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["season"], "all");
        assert_eq!(json["skip_threshold"], "instant");
        assert_eq!(json["streams"], 0);
    }
}
