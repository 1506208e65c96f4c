//! CatalogClient trait definition.

use super::models::{CatalogArtistId, CatalogError, CatalogTrackId, TrackAttributes};

/// Remote catalog used to enrich the listening history.
///
/// Calls are blocking and issued one at a time by the pipeline.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CatalogClient {
    /// Resolve an (artist, track) pair to a catalog identifier.
    /// `Ok(None)` means the catalog answered but had no match.
    fn search_track(
        &self,
        artist_name: &str,
        track_name: &str,
    ) -> Result<Option<CatalogTrackId>, CatalogError>;

    /// Fetch the derived audio attributes of a track.
    fn get_attributes(&self, track_id: &CatalogTrackId) -> Result<TrackAttributes, CatalogError>;

    /// Fetch the identifier of the artist owning a track.
    fn get_track_owner(&self, track_id: &CatalogTrackId) -> Result<CatalogArtistId, CatalogError>;

    /// Fetch the ordered genre tags of an artist. May be empty.
    fn get_genres(&self, artist_id: &CatalogArtistId) -> Result<Vec<String>, CatalogError>;
}
