//! ChunkStore trait definition.

use super::models::{ChunkId, ChunkKind};
use crate::enrichment::EnrichedRow;
use anyhow::Result;

/// Durable storage for partial pipeline output.
///
/// Chunks are only ever added; a committed chunk is never modified.
pub trait ChunkStore {
    /// Persist `rows` as the chunk ending at global input index `end_index`.
    fn append_chunk(
        &self,
        end_index: usize,
        kind: ChunkKind,
        rows: &[EnrichedRow],
    ) -> Result<ChunkId>;

    /// All committed chunks, ordered by end index.
    fn list_chunks(&self) -> Result<Vec<ChunkId>>;

    /// Where the chunks live, for messages.
    fn location(&self) -> String;

    /// Read back the rows of one chunk.
    fn read_chunk(&self, id: ChunkId) -> Result<Vec<EnrichedRow>>;

    /// The input index a resumed run should start from: the furthest point any
    /// committed chunk recorded, or 0 when there are none.
    fn resume_offset(&self) -> Result<usize> {
        Ok(self
            .list_chunks()?
            .iter()
            .map(|id| id.end_index)
            .max()
            .unwrap_or(0))
    }
}
