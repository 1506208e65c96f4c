//! Season selection shared by every report.

use crate::enrichment::EnrichedRow;
use crate::history::{parse_end_time, StreamEvent};
use chrono::{Datelike, NaiveDateTime};
use clap::ValueEnum;
use serde::Serialize;

/// Anything carrying an export `endTime`.
pub trait Timestamped {
    fn end_time(&self) -> &str;

    fn end_time_parsed(&self) -> Option<NaiveDateTime> {
        parse_end_time(self.end_time())
    }
}

impl Timestamped for StreamEvent {
    fn end_time(&self) -> &str {
        &self.end_time
    }
}

impl Timestamped for EnrichedRow {
    fn end_time(&self) -> &str {
        &self.end_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    All,
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn months(self) -> &'static [u32] {
        match self {
            Season::All => &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            Season::Spring => &[3, 4, 5],
            Season::Summer => &[6, 7, 8],
            Season::Autumn => &[9, 10, 11],
            Season::Winter => &[12, 1, 2],
        }
    }

    pub fn contains_month(self, month: u32) -> bool {
        self.months().contains(&month)
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::All => "All Year Long",
            Season::Spring => "Spring Tunes",
            Season::Summer => "Summer Bops",
            Season::Autumn => "Autumn Songs",
            Season::Winter => "Winter Jams",
        }
    }

    /// Whether `item` falls into this season. Unparseable timestamps only
    /// match [`Season::All`].
    pub fn matches<T: Timestamped + ?Sized>(self, item: &T) -> bool {
        match item.end_time_parsed() {
            Some(ts) => self.contains_month(ts.month()),
            None => self == Season::All,
        }
    }
}

/// Keeps the items whose month belongs to `season`, preserving order.
pub fn filter_by_season<T: Timestamped>(items: &[T], season: Season) -> Vec<&T> {
    items.iter().filter(|item| season.matches(*item)).collect()
}
