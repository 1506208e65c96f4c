//! Two-level cache for one pipeline run.
//!
//! Track level: catalog track id -> attributes and genres.
//! Artist level: catalog artist id -> genres, shared by every track of that artist.
//! Entries are never invalidated; the cache is dropped with the pipeline.

use super::models::TrackEnrichment;
use crate::catalog_client::{CatalogArtistId, CatalogTrackId, TrackAttributes};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CachedTrack {
    attributes: TrackAttributes,
    genres: Vec<String>,
}

/// Hit/miss counters, reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub track_hits: usize,
    pub track_misses: usize,
    pub artist_hits: usize,
    pub artist_misses: usize,
}

#[derive(Debug, Default)]
pub struct EnrichmentCache {
    tracks: HashMap<CatalogTrackId, CachedTrack>,
    artists: HashMap<CatalogArtistId, Vec<String>>,
    stats: CacheStats,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a track, counting the hit or miss.
    pub fn lookup_track(&mut self, track_id: &CatalogTrackId) -> Option<TrackEnrichment> {
        match self.tracks.get(track_id) {
            Some(cached) => {
                self.stats.track_hits += 1;
                Some(TrackEnrichment {
                    track_id: track_id.clone(),
                    attributes: cached.attributes,
                    genres: cached.genres.clone(),
                })
            }
            None => {
                self.stats.track_misses += 1;
                None
            }
        }
    }

    /// Looks up an artist's genres, counting the hit or miss.
    pub fn lookup_artist(&mut self, artist_id: &CatalogArtistId) -> Option<Vec<String>> {
        match self.artists.get(artist_id) {
            Some(genres) => {
                self.stats.artist_hits += 1;
                Some(genres.clone())
            }
            None => {
                self.stats.artist_misses += 1;
                None
            }
        }
    }

    /// Records a fully resolved track. An existing entry is kept as is.
    pub fn insert_track(&mut self, enrichment: &TrackEnrichment) {
        self.tracks
            .entry(enrichment.track_id.clone())
            .or_insert_with(|| CachedTrack {
                attributes: enrichment.attributes,
                genres: enrichment.genres.clone(),
            });
    }

    /// Records an artist's genres. An existing entry is kept as is.
    pub fn insert_artist(&mut self, artist_id: CatalogArtistId, genres: Vec<String>) {
        self.artists.entry(artist_id).or_insert(genres);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn tracks_len(&self) -> usize {
        self.tracks.len()
    }

    pub fn artists_len(&self) -> usize {
        self.artists.len()
    }
}
