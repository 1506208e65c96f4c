//! Reassembles committed chunks into the final enriched table.

use super::store::CsvChunkStore;
use super::table::write_enriched_table;
use super::trait_def::ChunkStore;
use crate::enrichment::EnrichedRow;
use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

/// Sorts rows by (end time, key) ascending.
///
/// The sort is stable, so rows sharing both fields keep their chunk order.
pub fn sort_enriched_rows(rows: &mut [EnrichedRow]) {
    rows.sort_by(|a, b| a.end_time.cmp(&b.end_time).then_with(|| a.key.cmp(&b.key)));
}

/// Reads every committed chunk, in chunk order, and returns the sorted table.
///
/// Fails when the store holds no chunks, so an existing final table is never
/// replaced by an empty one.
pub fn merge_all_chunks<S: ChunkStore + ?Sized>(store: &S) -> Result<Vec<EnrichedRow>> {
    let chunks = store.list_chunks()?;
    if chunks.is_empty() {
        bail!("No checkpoint chunks found in {}", store.location());
    }
    let mut rows = Vec::new();
    for id in &chunks {
        let mut chunk_rows = store.read_chunk(*id)?;
        rows.append(&mut chunk_rows);
    }
    sort_enriched_rows(&mut rows);
    info!("Merged {} chunk(s) into {} rows", chunks.len(), rows.len());
    Ok(rows)
}

/// Merges the chunk files found in `dir`.
pub fn merge_chunk_dir(dir: &Path) -> Result<Vec<EnrichedRow>> {
    let store = CsvChunkStore::open_existing(dir)?;
    merge_all_chunks(&store)
}

/// Merges all chunks and writes the result to `output_path`. Returns the row count.
pub fn merge_to_file<S: ChunkStore + ?Sized>(store: &S, output_path: &Path) -> Result<usize> {
    let rows = merge_all_chunks(store)?;
    write_enriched_table(output_path, &rows)?;
    info!("Wrote {} rows to {:?}", rows.len(), output_path);
    Ok(rows.len())
}
