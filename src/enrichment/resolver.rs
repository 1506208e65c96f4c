//! Per-track resolution against the catalog, through the run cache.

use super::cache::EnrichmentCache;
use super::models::{SkipReason, TrackEnrichment, TrackResolution};
use crate::catalog_client::CatalogClient;
use crate::history::StreamEvent;
use tracing::debug;

/// Resolves one stream event to its attributes and genres.
///
/// Remote calls per event:
/// - cached track: search only
/// - new track, known artist: search, attributes, owner
/// - new track, new artist: search, attributes, owner, genres
///
/// Nothing is written to the track cache unless every call succeeded.
pub fn resolve_track<C: CatalogClient + ?Sized>(
    client: &C,
    cache: &mut EnrichmentCache,
    event: &StreamEvent,
) -> TrackResolution {
    match try_resolve(client, cache, event) {
        Ok(enrichment) => TrackResolution::Resolved(enrichment),
        Err(reason) => TrackResolution::Skipped(reason),
    }
}

fn try_resolve<C: CatalogClient + ?Sized>(
    client: &C,
    cache: &mut EnrichmentCache,
    event: &StreamEvent,
) -> Result<TrackEnrichment, SkipReason> {
    let track_id = client
        .search_track(&event.artist_name, &event.track_name)
        .map_err(SkipReason::Catalog)?
        .ok_or(SkipReason::NoMatch)?;

    if let Some(cached) = cache.lookup_track(&track_id) {
        return Ok(cached);
    }

    let attributes = client
        .get_attributes(&track_id)
        .map_err(SkipReason::Catalog)?;
    let artist_id = client
        .get_track_owner(&track_id)
        .map_err(SkipReason::Catalog)?;

    let genres = match cache.lookup_artist(&artist_id) {
        Some(genres) => genres,
        None => {
            let genres = client.get_genres(&artist_id).map_err(SkipReason::Catalog)?;
            debug!("Artist {} has {} genre(s)", artist_id, genres.len());
            cache.insert_artist(artist_id, genres.clone());
            genres
        }
    };

    let enrichment = TrackEnrichment {
        track_id,
        attributes,
        genres,
    };
    cache.insert_track(&enrichment);
    Ok(enrichment)
}
