//! Joins stream events with catalog data, one output row per genre tag.

mod cache;
mod models;
mod pipeline;
mod progress;
mod resolver;

pub use cache::{CacheStats, EnrichmentCache};
pub use models::{EnrichedRow, SkipReason, SkippedTrack, TrackEnrichment, TrackResolution};
pub use pipeline::{EnrichmentPipeline, PipelineSettings, RunSummary};
pub use progress::{format_elapsed, ProgressReporter};
pub use resolver::resolve_track;
