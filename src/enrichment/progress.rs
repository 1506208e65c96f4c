//! Periodic progress lines for long enrichment runs.

use std::time::{Duration, Instant};
use tracing::info;

pub struct ProgressReporter {
    every: usize,
    offset: usize,
    total: usize,
    started: Instant,
}

impl ProgressReporter {
    /// `offset` is the number of input rows skipped by a resumed run; it counts
    /// toward completion so resumed runs report global progress.
    pub fn new(every: usize, offset: usize, total: usize) -> Self {
        Self {
            every: every.max(1),
            offset,
            total,
            started: Instant::now(),
        }
    }

    /// Whether record `i` (0-based within this run) gets a progress line.
    pub fn is_due(&self, i: usize) -> bool {
        i % self.every == 0
    }

    pub fn percent_complete(&self, i: usize) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let fraction = (self.offset + i) as f64 / self.total as f64;
        (fraction * 1000.0).round() / 10.0
    }

    pub fn report(&self, i: usize) {
        if self.is_due(i) {
            info!(
                "Time Elapsed: {}, Percent Complete: {}%",
                format_elapsed(self.started.elapsed()),
                self.percent_complete(i)
            );
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Formats a duration as `HH:MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 7)), "03:00:07");
    }

    #[test]
    fn test_cadence() {
        let reporter = ProgressReporter::new(100, 0, 1000);
        assert!(reporter.is_due(0));
        assert!(!reporter.is_due(99));
        assert!(reporter.is_due(100));
    }

    #[test]
    fn test_percent_includes_offset() {
        let reporter = ProgressReporter::new(10, 500, 1000);
        assert_eq!(reporter.percent_complete(0), 50.0);
        assert_eq!(reporter.percent_complete(250), 75.0);

        let fresh = ProgressReporter::new(10, 0, 3);
        assert_eq!(fresh.percent_complete(1), 33.3);
    }

    #[test]
    fn test_zero_cadence_is_clamped() {
        let reporter = ProgressReporter::new(0, 0, 10);
        assert!(reporter.is_due(3));
    }
}
