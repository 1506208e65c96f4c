//! In-memory catalog that counts every remote call.
#![allow(dead_code)]

use listening_insights::catalog_client::{
    CatalogArtistId, CatalogClient, CatalogError, CatalogTrackId, TrackAttributes,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallCounts {
    pub search: usize,
    pub attributes: usize,
    pub owner: usize,
    pub genres: usize,
}

#[derive(Default)]
pub struct FakeCatalog {
    tracks: HashMap<(String, String), CatalogTrackId>,
    attributes: HashMap<CatalogTrackId, TrackAttributes>,
    owners: HashMap<CatalogTrackId, CatalogArtistId>,
    genres: HashMap<CatalogArtistId, Vec<String>>,
    failing_attributes: HashSet<CatalogTrackId>,
    failing_searches: HashSet<(String, String)>,
    search_calls: AtomicUsize,
    attributes_calls: AtomicUsize,
    owner_calls: AtomicUsize,
    genres_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(
        mut self,
        artist_name: &str,
        track_name: &str,
        track_id: &str,
        attributes: TrackAttributes,
        artist_id: &str,
    ) -> Self {
        let id = CatalogTrackId::new(track_id);
        self.tracks.insert(
            (artist_name.to_string(), track_name.to_string()),
            id.clone(),
        );
        self.attributes.insert(id.clone(), attributes);
        self.owners.insert(id, CatalogArtistId::new(artist_id));
        self
    }

    pub fn with_artist(mut self, artist_id: &str, genres: &[&str]) -> Self {
        self.genres.insert(
            CatalogArtistId::new(artist_id),
            genres.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    /// Attribute lookups for `track_id` answer with a server error.
    pub fn with_failing_attributes(mut self, track_id: &str) -> Self {
        self.failing_attributes.insert(CatalogTrackId::new(track_id));
        self
    }

    /// Searches for this artist and track fail at the transport level.
    pub fn with_failing_search(mut self, artist_name: &str, track_name: &str) -> Self {
        self.failing_searches
            .insert((artist_name.to_string(), track_name.to_string()));
        self
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            search: self.search_calls.load(Ordering::SeqCst),
            attributes: self.attributes_calls.load(Ordering::SeqCst),
            owner: self.owner_calls.load(Ordering::SeqCst),
            genres: self.genres_calls.load(Ordering::SeqCst),
        }
    }
}

impl CatalogClient for FakeCatalog {
    fn search_track(
        &self,
        artist_name: &str,
        track_name: &str,
    ) -> Result<Option<CatalogTrackId>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let query = (artist_name.to_string(), track_name.to_string());
        if self.failing_searches.contains(&query) {
            return Err(CatalogError::Connection("connection reset by peer".to_string()));
        }
        Ok(self.tracks.get(&query).cloned())
    }

    fn get_attributes(&self, track_id: &CatalogTrackId) -> Result<TrackAttributes, CatalogError> {
        self.attributes_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_attributes.contains(track_id) {
            return Err(CatalogError::Api {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        self.attributes
            .get(track_id)
            .copied()
            .ok_or_else(|| CatalogError::InvalidResponse(format!("no attributes for {}", track_id)))
    }

    fn get_track_owner(&self, track_id: &CatalogTrackId) -> Result<CatalogArtistId, CatalogError> {
        self.owner_calls.fetch_add(1, Ordering::SeqCst);
        self.owners
            .get(track_id)
            .cloned()
            .ok_or_else(|| CatalogError::InvalidResponse(format!("no owner for {}", track_id)))
    }

    fn get_genres(&self, artist_id: &CatalogArtistId) -> Result<Vec<String>, CatalogError> {
        self.genres_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.genres.get(artist_id).cloned().unwrap_or_default())
    }
}
