//! Audio attribute trends over time.

use super::season::{Season, Timestamped};
use crate::enrichment::EnrichedRow;
use chrono::{Datelike, Duration, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    /// Weeks end on Sunday.
    Weekly,
    /// Months are labelled by their last day.
    Monthly,
}

impl Granularity {
    /// The date labelling the bucket that contains `date`.
    pub fn bucket_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                let days_to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
                date + Duration::days(days_to_sunday as i64)
            }
            Granularity::Monthly => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|first| first.pred_opt())
                    .unwrap_or(date)
            }
        }
    }
}

/// Normalised attribute means of one bucket. Every series is scaled to [0, 1]
/// across the reported buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Bucket end date, `YYYY-MM-DD`.
    pub period: String,
    pub rows: usize,
    pub energy: f64,
    pub loudness: f64,
    pub danceability: f64,
}

#[derive(Default)]
struct Sums {
    rows: usize,
    energy: f64,
    loudness: f64,
    danceability: f64,
}

/// Min-max scales `values` in place. A constant series becomes all zeros.
pub fn min_max_normalize(values: &mut [f64]) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    for v in values.iter_mut() {
        *v = if range > 0.0 { (*v - min) / range } else { 0.0 };
    }
}

/// Mean energy, absolute loudness and danceability per bucket, each series
/// min-max normalised. Only buckets holding at least one row are reported.
///
/// For [`Season::Spring`] rows from `current_year` are left out, since the
/// current spring is usually incomplete.
pub fn attribute_trends(
    rows: &[&EnrichedRow],
    granularity: Granularity,
    season: Season,
    current_year: i32,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, Sums> = BTreeMap::new();

    for row in rows {
        let Some(ts) = row.end_time_parsed() else {
            continue;
        };
        if season == Season::Spring && ts.year() == current_year {
            continue;
        }
        let sums = buckets
            .entry(granularity.bucket_end(ts.date()))
            .or_default();
        sums.rows += 1;
        sums.energy += row.energy;
        sums.loudness += row.loudness;
        sums.danceability += row.danceability;
    }

    let mut energy = Vec::with_capacity(buckets.len());
    let mut loudness = Vec::with_capacity(buckets.len());
    let mut danceability = Vec::with_capacity(buckets.len());
    for sums in buckets.values() {
        let n = sums.rows as f64;
        energy.push(sums.energy / n);
        loudness.push((sums.loudness / n).abs());
        danceability.push(sums.danceability / n);
    }
    min_max_normalize(&mut energy);
    min_max_normalize(&mut loudness);
    min_max_normalize(&mut danceability);

    buckets
        .iter()
        .enumerate()
        .map(|(i, (period, sums))| TrendPoint {
            period: period.format("%Y-%m-%d").to_string(),
            rows: sums.rows,
            energy: energy[i],
            loudness: loudness[i],
            danceability: danceability[i],
        })
        .collect()
}
