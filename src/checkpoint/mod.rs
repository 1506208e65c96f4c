//! Checkpointing of partial enrichment output and the final merge.

mod merge;
mod models;
mod store;
mod table;
mod trait_def;

pub use merge::{merge_all_chunks, merge_chunk_dir, merge_to_file, sort_enriched_rows};
pub use models::{ChunkId, ChunkKind, CHUNK_FILE_PREFIX};
pub use store::CsvChunkStore;
pub use table::{read_enriched_table, write_enriched_table, ENRICHED_HEADER};
pub use trait_def::ChunkStore;
