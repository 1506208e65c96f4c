//! Catalog Client: resolves listening history entries against a remote music catalog.

mod auth;
mod models;
mod spotify;
mod trait_def;

pub use auth::{request_access_token, AccessToken, Credentials};
pub use models::{CatalogArtistId, CatalogError, CatalogTrackId, TrackAttributes};
pub use spotify::SpotifyCatalogClient;
pub use trait_def::CatalogClient;

#[cfg(feature = "mock")]
pub use trait_def::MockCatalogClient;
