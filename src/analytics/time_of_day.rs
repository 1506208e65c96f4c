//! Listening pattern over the day in 15-minute slots.

use super::season::Timestamped;
use chrono::{NaiveTime, Timelike};
use serde::Serialize;

pub const SLOT_MINUTES: u32 = 15;
pub const SLOTS_PER_DAY: usize = 96;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    /// Slot start in local time, `hh:mm:ss AM/PM`.
    pub label: String,
    pub plays: usize,
}

fn slot_label(slot: usize) -> String {
    let minutes = slot as u32 * SLOT_MINUTES;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .map(|t| t.format("%I:%M:%S %p").to_string())
        .unwrap_or_default()
}

/// Counts plays per 15-minute slot of the day. Export timestamps are UTC; each
/// slot is moved by `utc_offset_hours` (wrapping at midnight) and the result
/// lists all 96 local slots starting at midnight.
pub fn listening_pattern<T: Timestamped>(items: &[&T], utc_offset_hours: i32) -> Vec<TimeSlot> {
    let shift = utc_offset_hours * (60 / SLOT_MINUTES as i32);
    let mut plays = [0usize; SLOTS_PER_DAY];

    for item in items {
        let Some(ts) = item.end_time_parsed() else {
            continue;
        };
        let utc_slot = ((ts.hour() * 60 + ts.minute()) / SLOT_MINUTES) as i32;
        let local_slot = (utc_slot + shift).rem_euclid(SLOTS_PER_DAY as i32) as usize;
        plays[local_slot] += 1;
    }

    plays
        .iter()
        .enumerate()
        .map(|(slot, &plays)| TimeSlot {
            label: slot_label(slot),
            plays,
        })
        .collect()
}
