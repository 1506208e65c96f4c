//! Enrichment pipeline driver.
//!
//! Walks the listening history from a resume offset, resolves every stream
//! event through the catalog (via the run cache), checkpoints the produced
//! rows every `chunk_size` input rows, and finally merges every chunk on disk
//! into the sorted output table.
//!
//! ```text
//! events[offset..] -> resolve_track -> fan_out -> pending rows
//!                                                  |  every chunk_size inputs
//!                                                  v
//!                                             ChunkStore -> merge -> final CSV
//! ```

use super::cache::{CacheStats, EnrichmentCache};
use super::models::{EnrichedRow, SkippedTrack, TrackResolution};
use super::progress::{format_elapsed, ProgressReporter};
use super::resolver::resolve_track;
use crate::catalog_client::CatalogClient;
use crate::checkpoint::{merge_to_file, ChunkId, ChunkKind, ChunkStore};
use crate::history::StreamEvent;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Input rows per checkpoint chunk.
    pub chunk_size: usize,
    /// A progress line every this many input rows.
    pub progress_every: usize,
    /// Stop after this many input rows (test runs).
    pub max_records: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            progress_every: 100,
            max_records: None,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub offset: usize,
    pub total_input: usize,
    /// Input rows consumed by this run.
    pub processed: usize,
    pub resolved: usize,
    pub skipped: Vec<SkippedTrack>,
    pub rows_emitted: usize,
    pub chunks_written: Vec<ChunkId>,
    /// Where a follow-up run should resume.
    pub next_offset: usize,
    pub interrupted: bool,
    pub cache: CacheStats,
    /// Row count of the merged output, if the merge ran.
    pub merged_rows: Option<usize>,
}

pub struct EnrichmentPipeline<'a, C: ?Sized, S: ?Sized> {
    client: &'a C,
    store: &'a S,
    settings: PipelineSettings,
    cache: EnrichmentCache,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<'a, C, S> EnrichmentPipeline<'a, C, S>
where
    C: CatalogClient + ?Sized,
    S: ChunkStore + ?Sized,
{
    pub fn new(client: &'a C, store: &'a S, settings: PipelineSettings) -> Self {
        Self {
            client,
            store,
            settings,
            cache: EnrichmentCache::new(),
            cancel_flag: None,
        }
    }

    /// Stop at the next record boundary once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn cache(&self) -> &EnrichmentCache {
        &self.cache
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Enriches `events[offset..]` and writes checkpoint chunks. Does not merge.
    pub fn process(&mut self, events: &[StreamEvent], offset: usize) -> Result<RunSummary> {
        if offset > events.len() {
            bail!(
                "Resume offset {} is beyond the end of the input ({} rows)",
                offset,
                events.len()
            );
        }

        let chunk_size = self.settings.chunk_size.max(1);
        let end = match self.settings.max_records {
            Some(limit) => offset.saturating_add(limit).min(events.len()),
            None => events.len(),
        };

        info!(
            "Enriching input rows {}..{} of {} (chunk size {})",
            offset,
            end,
            events.len(),
            chunk_size
        );

        let reporter = ProgressReporter::new(self.settings.progress_every, offset, events.len());
        let mut summary = RunSummary {
            offset,
            total_input: events.len(),
            ..RunSummary::default()
        };
        let mut pending: Vec<EnrichedRow> = Vec::new();
        let mut inputs_since_flush = 0usize;

        for (i, event) in events[offset..end].iter().enumerate() {
            if self.is_cancelled() {
                summary.interrupted = true;
                break;
            }

            match resolve_track(self.client, &mut self.cache, event) {
                TrackResolution::Resolved(enrichment) => {
                    let mut rows = enrichment.fan_out(event);
                    summary.resolved += 1;
                    summary.rows_emitted += rows.len();
                    pending.append(&mut rows);
                }
                TrackResolution::Skipped(reason) => {
                    warn!(
                        "Passing... catalog did not return sufficient information for: {} by {} ({})",
                        event.track_name, event.artist_name, reason
                    );
                    summary.skipped.push(SkippedTrack {
                        input_index: offset + i,
                        artist_name: event.artist_name.clone(),
                        track_name: event.track_name.clone(),
                        reason: reason.to_string(),
                    });
                }
            }

            summary.processed += 1;
            inputs_since_flush += 1;
            reporter.report(i);

            if inputs_since_flush == chunk_size {
                let id = self
                    .store
                    .append_chunk(offset + i + 1, ChunkKind::Batch, &pending)?;
                summary.chunks_written.push(id);
                pending.clear();
                inputs_since_flush = 0;
            }
        }

        summary.next_offset = offset + summary.processed;

        if inputs_since_flush > 0 {
            let id = self
                .store
                .append_chunk(summary.next_offset, ChunkKind::Leftover, &pending)?;
            summary.chunks_written.push(id);
        }

        summary.cache = self.cache.stats();
        info!(
            "Enriched {} of {} rows in {} ({} resolved, {} skipped, {} output rows)",
            summary.processed,
            end - offset,
            format_elapsed(reporter.elapsed()),
            summary.resolved,
            summary.skipped.len(),
            summary.rows_emitted
        );
        Ok(summary)
    }

    /// Enriches from `offset`, then merges every chunk in the store into
    /// `output_path`. An interrupted run skips the merge.
    pub fn run(
        &mut self,
        events: &[StreamEvent],
        offset: usize,
        output_path: &Path,
    ) -> Result<RunSummary> {
        let mut summary = self.process(events, offset)?;

        if summary.interrupted {
            warn!(
                "Run interrupted after {} rows; resume from offset {}",
                summary.processed, summary.next_offset
            );
            return Ok(summary);
        }

        let merged = merge_to_file(self.store, output_path)?;
        summary.merged_rows = Some(merged);
        info!(
            "Processing complete. {} rows written to {:?}",
            merged, output_path
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_client::{CatalogArtistId, CatalogError, CatalogTrackId, TrackAttributes};
    use crate::checkpoint::CsvChunkStore;
    use tempfile::TempDir;

    /// Every track resolves to its own id and one genre, except tracks named "?".
    struct EchoCatalog;

    impl CatalogClient for EchoCatalog {
        fn search_track(
            &self,
            artist_name: &str,
            track_name: &str,
        ) -> Result<Option<CatalogTrackId>, CatalogError> {
            if track_name == "?" {
                return Ok(None);
            }
            Ok(Some(CatalogTrackId::new(format!("{}/{}", artist_name, track_name))))
        }

        fn get_attributes(&self, _: &CatalogTrackId) -> Result<TrackAttributes, CatalogError> {
            Ok(TrackAttributes {
                energy: 0.5,
                loudness: -5.0,
                danceability: 0.5,
            })
        }

        fn get_track_owner(&self, id: &CatalogTrackId) -> Result<CatalogArtistId, CatalogError> {
            Ok(CatalogArtistId::new(id.as_str().split('/').next().unwrap()))
        }

        fn get_genres(&self, _: &CatalogArtistId) -> Result<Vec<String>, CatalogError> {
            Ok(vec!["pop".to_string()])
        }
    }

    fn events(n: usize) -> Vec<StreamEvent> {
        (0..n)
            .map(|i| StreamEvent::new(format!("2021-01-01 00:{:02}", i), "A", format!("T{}", i), 1))
            .collect()
    }

    fn settings(chunk_size: usize) -> PipelineSettings {
        PipelineSettings {
            chunk_size,
            progress_every: 1,
            max_records: None,
        }
    }

    #[test]
    fn test_chunks_named_by_global_end_index() {
        let dir = TempDir::new().unwrap();
        let store = CsvChunkStore::open(dir.path()).unwrap();
        let mut pipeline = EnrichmentPipeline::new(&EchoCatalog, &store, settings(3));

        let summary = pipeline.process(&events(8), 0).unwrap();
        assert_eq!(
            summary.chunks_written,
            vec![ChunkId::batch(3), ChunkId::batch(6), ChunkId::leftover(8)]
        );
        assert_eq!(summary.next_offset, 8);
        assert_eq!(summary.rows_emitted, 8);
    }

    #[test]
    fn test_resumed_run_offsets_chunk_names() {
        let dir = TempDir::new().unwrap();
        let store = CsvChunkStore::open(dir.path()).unwrap();
        let mut pipeline = EnrichmentPipeline::new(&EchoCatalog, &store, settings(2));

        let summary = pipeline.process(&events(7), 3).unwrap();
        assert_eq!(
            summary.chunks_written,
            vec![ChunkId::batch(5), ChunkId::batch(7)]
        );
        assert_eq!(summary.processed, 4);
    }

    #[test]
    fn test_batch_without_output_is_still_checkpointed() {
        let dir = TempDir::new().unwrap();
        let store = CsvChunkStore::open(dir.path()).unwrap();
        let input = vec![
            StreamEvent::new("2021-01-01 00:00", "A", "?", 1),
            StreamEvent::new("2021-01-01 00:01", "A", "?", 1),
        ];
        let mut pipeline = EnrichmentPipeline::new(&EchoCatalog, &store, settings(2));

        let summary = pipeline.process(&input, 0).unwrap();
        assert_eq!(summary.skipped.len(), 2);
        assert_eq!(summary.chunks_written, vec![ChunkId::batch(2)]);
        assert!(store.read_chunk(ChunkId::batch(2)).unwrap().is_empty());
        assert_eq!(store.resume_offset().unwrap(), 2);
    }

    #[test]
    fn test_offset_beyond_input_fails() {
        let dir = TempDir::new().unwrap();
        let store = CsvChunkStore::open(dir.path()).unwrap();
        let mut pipeline = EnrichmentPipeline::new(&EchoCatalog, &store, settings(2));
        let err = pipeline.process(&events(2), 3).unwrap_err();
        assert!(err.to_string().contains("beyond the end"));
    }

    #[test]
    fn test_offset_at_end_only_merges() {
        let dir = TempDir::new().unwrap();
        let store = CsvChunkStore::open(dir.path().join("chunks")).unwrap();
        let output = dir.path().join("final.csv");
        let input = events(4);

        EnrichmentPipeline::new(&EchoCatalog, &store, settings(10))
            .run(&input, 0, &output)
            .unwrap();
        let summary = EnrichmentPipeline::new(&EchoCatalog, &store, settings(10))
            .run(&input, 4, &output)
            .unwrap();

        assert_eq!(summary.processed, 0);
        assert!(summary.chunks_written.is_empty());
        assert_eq!(summary.merged_rows, Some(4));
    }

    #[test]
    fn test_max_records_limits_run() {
        let dir = TempDir::new().unwrap();
        let store = CsvChunkStore::open(dir.path()).unwrap();
        let mut pipeline = EnrichmentPipeline::new(
            &EchoCatalog,
            &store,
            PipelineSettings {
                chunk_size: 50,
                progress_every: 10,
                max_records: Some(3),
            },
        );

        let summary = pipeline.process(&events(10), 2).unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.next_offset, 5);
        assert_eq!(summary.chunks_written, vec![ChunkId::leftover(5)]);
    }

    #[test]
    fn test_cancelled_run_flushes_and_skips_merge() {
        let dir = TempDir::new().unwrap();
        let store = CsvChunkStore::open(dir.path().join("chunks")).unwrap();
        let output = dir.path().join("final.csv");
        let flag = Arc::new(AtomicBool::new(true));

        let summary = EnrichmentPipeline::new(&EchoCatalog, &store, settings(2))
            .with_cancel_flag(flag)
            .run(&events(5), 0, &output)
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.merged_rows, None);
        assert!(!output.exists());
    }
}
