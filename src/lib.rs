//! Listening Insights Library
//!
//! Enriches a streaming-history export with catalog audio attributes and
//! artist genres, checkpointing partial output so long runs can resume, and
//! aggregates the result into dashboard-ready tables.
//!
//! This library exposes the internal modules for the binary and for testing.

pub mod analytics;
pub mod catalog_client;
pub mod checkpoint;
pub mod config;
pub mod enrichment;
pub mod history;

// Re-export commonly used types for convenience
pub use catalog_client::{CatalogClient, CatalogError, SpotifyCatalogClient};
pub use checkpoint::{ChunkStore, CsvChunkStore};
pub use enrichment::{EnrichedRow, EnrichmentPipeline, PipelineSettings, RunSummary};
pub use history::{LibraryEntry, StreamEvent};
