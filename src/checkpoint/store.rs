//! Directory-of-CSV-files implementation of [`ChunkStore`].

use super::models::{ChunkId, ChunkKind};
use super::table::{read_enriched_table, write_enriched_table};
use super::trait_def::ChunkStore;
use crate::enrichment::EnrichedRow;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct CsvChunkStore {
    dir: PathBuf,
}

impl CsvChunkStore {
    /// Opens the chunk directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create chunk directory {:?}", dir))?;
        Ok(Self { dir })
    }

    /// Opens an existing chunk directory without creating anything.
    pub fn open_existing(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            bail!("Chunk directory {:?} does not exist", dir);
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn chunk_path(&self, id: ChunkId) -> PathBuf {
        self.dir.join(id.file_name())
    }
}

impl ChunkStore for CsvChunkStore {
    fn append_chunk(
        &self,
        end_index: usize,
        kind: ChunkKind,
        rows: &[EnrichedRow],
    ) -> Result<ChunkId> {
        let id = ChunkId { end_index, kind };
        let path = self.chunk_path(id);
        if path.exists() {
            warn!("Chunk {} already exists and will be replaced", id);
        }
        write_enriched_table(&path, rows)?;
        debug!("Wrote chunk {} ({} rows)", id, rows.len());
        Ok(id)
    }

    fn list_chunks(&self) -> Result<Vec<ChunkId>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read chunk directory {:?}", self.dir))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(ChunkId::parse_file_name) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn location(&self) -> String {
        format!("{:?}", self.dir)
    }

    fn read_chunk(&self, id: ChunkId) -> Result<Vec<EnrichedRow>> {
        read_enriched_table(&self.chunk_path(id))
    }
}
