//! Checkpoint chunk identifiers.

use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

pub const CHUNK_FILE_PREFIX: &str = "audio_features";
const CHUNK_FILE_PATTERN: &str = r"^audio_features_(\d+)(_leftover)?\.csv$";

/// Why a chunk was flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// A full batch of input rows.
    Batch,
    /// Whatever was left when the run ended or was interrupted.
    Leftover,
}

/// Identifies one chunk file: the exclusive global input index reached when
/// it was flushed, plus its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChunkId {
    pub end_index: usize,
    pub kind: ChunkKind,
}

impl ChunkId {
    pub fn batch(end_index: usize) -> Self {
        Self {
            end_index,
            kind: ChunkKind::Batch,
        }
    }

    pub fn leftover(end_index: usize) -> Self {
        Self {
            end_index,
            kind: ChunkKind::Leftover,
        }
    }

    pub fn file_name(&self) -> String {
        match self.kind {
            ChunkKind::Batch => format!("{}_{:08}.csv", CHUNK_FILE_PREFIX, self.end_index),
            ChunkKind::Leftover => {
                format!("{}_{:08}_leftover.csv", CHUNK_FILE_PREFIX, self.end_index)
            }
        }
    }

    /// Parses a chunk file name. Anything else in the directory yields `None`.
    pub fn parse_file_name(name: &str) -> Option<Self> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(CHUNK_FILE_PATTERN).ok())
            .as_ref()?;

        let captures = pattern.captures(name)?;
        let end_index = captures[1].parse().ok()?;
        let kind = if captures.get(2).is_some() {
            ChunkKind::Leftover
        } else {
            ChunkKind::Batch
        };
        Some(Self { end_index, kind })
    }
}

impl Ord for ChunkId {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = |kind: ChunkKind| match kind {
            ChunkKind::Batch => 0,
            ChunkKind::Leftover => 1,
        };
        self.end_index
            .cmp(&other.end_index)
            .then(rank(self.kind).cmp(&rank(other.kind)))
    }
}

impl PartialOrd for ChunkId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
