//! CSV reading and writing of enriched tables.

use crate::enrichment::EnrichedRow;
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Header of every chunk and of the final output, in column order.
pub const ENRICHED_HEADER: [&str; 9] = [
    "endTime",
    "artistName",
    "trackName",
    "msPlayed",
    "artist_and_song",
    "energy",
    "loudness",
    "danceability",
    "genres",
];

/// Writes `rows` to `path` with the canonical header.
///
/// The table is written to a temporary file next to `path` and renamed into
/// place, so readers see either the previous file or the complete new one.
pub fn write_enriched_table(path: &Path, rows: &[EnrichedRow]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(tmp);
    writer
        .write_record(ENRICHED_HEADER)
        .with_context(|| format!("Failed to write header of {:?}", path))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {:?}", path))?;
    }

    let tmp = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush {:?}: {}", path, e.error()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync {:?}", path))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move table into place at {:?}", path))?;
    Ok(())
}

/// Reads an enriched table, keeping only the canonical columns.
pub fn read_enriched_table(path: &Path) -> Result<Vec<EnrichedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    reader
        .deserialize::<EnrichedRow>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Bad row {} in {:?}", i + 1, path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(end_time: &str, genre: &str) -> EnrichedRow {
        EnrichedRow {
            end_time: end_time.to_string(),
            artist_name: "A".to_string(),
            track_name: "X, live".to_string(),
            ms_played: 12345,
            key: "A - X, live".to_string(),
            energy: 0.731,
            loudness: -5.5,
            danceability: 0.25,
            genre: genre.to_string(),
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.csv");
        let rows = vec![row("2021-01-01 10:00", "pop"), row("2021-01-01 10:05", "rock")];

        write_enriched_table(&path, &rows).unwrap();
        assert_eq!(read_enriched_table(&path).unwrap(), rows);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(
            "endTime,artistName,trackName,msPlayed,artist_and_song,energy,loudness,danceability,genres\n"
        ));
        // no temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_empty_table_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_enriched_table(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(read_enriched_table(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_filters_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(
            &path,
            ",endTime,artistName,trackName,msPlayed,artist_and_song,energy,loudness,danceability,genres,date_filter\n\
             0,2021-01-01 10:00,A,X,100,A - X,0.5,-3.0,0.7,pop,2021-01-01\n",
        )
        .unwrap();

        let rows = read_enriched_table(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "A - X");
        assert_eq!(rows[0].genre, "pop");
        assert_eq!(rows[0].loudness, -3.0);
    }

    #[test]
    fn test_read_bad_row_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "endTime,artistName,trackName,msPlayed,artist_and_song,energy,loudness,danceability,genres\n\
             2021-01-01 10:00,A,X,not-a-number,A - X,0.5,-3.0,0.7,pop\n",
        )
        .unwrap();
        assert!(read_enriched_table(&path).is_err());
    }
}
