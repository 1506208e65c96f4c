//! Spotify Web API implementation of [`CatalogClient`].
//!
//! Uses a blocking HTTP client: the enrichment pipeline issues one call at a
//! time, so there is nothing to overlap.

use super::auth::{request_access_token, AccessToken, Credentials};
use super::models::{CatalogArtistId, CatalogError, CatalogTrackId, TrackAttributes};
use super::trait_def::CatalogClient;
use crate::config::CatalogSettings;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

pub struct SpotifyCatalogClient {
    client: Client,
    api_base_url: String,
    auth_url: String,
    credentials: Credentials,
    token: Mutex<AccessToken>,
    min_request_interval: Duration,
    max_rate_limit_retries: u32,
    last_request: Mutex<Instant>,
}

// -- Response shapes (only the fields the pipeline reads) --

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<SearchTracks>,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    energy: Option<f64>,
    loudness: Option<f64>,
    danceability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(default)]
    artists: Vec<TrackArtist>,
}

#[derive(Debug, Deserialize)]
struct TrackArtist {
    id: Option<String>,
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistResponse {
    genres: Option<Vec<String>>,
}

impl SearchResponse {
    fn into_track_id(self) -> Result<Option<CatalogTrackId>, CatalogError> {
        let tracks = self
            .tracks
            .ok_or_else(|| CatalogError::InvalidResponse("search response has no tracks".into()))?;
        match tracks.items.into_iter().next() {
            None => Ok(None),
            Some(item) => item
                .id
                .filter(|id| !id.is_empty())
                .map(|id| Some(CatalogTrackId(id)))
                .ok_or_else(|| CatalogError::InvalidResponse("search item has no id".into())),
        }
    }
}

impl AudioFeaturesResponse {
    fn into_attributes(self) -> Result<TrackAttributes, CatalogError> {
        match (self.energy, self.loudness, self.danceability) {
            (Some(energy), Some(loudness), Some(danceability)) => Ok(TrackAttributes {
                energy,
                loudness,
                danceability,
            }),
            _ => Err(CatalogError::InvalidResponse(
                "audio features are incomplete".into(),
            )),
        }
    }
}

impl TrackResponse {
    fn into_owner(self) -> Result<CatalogArtistId, CatalogError> {
        let artist = self
            .artists
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::InvalidResponse("track has no artists".into()))?;

        // "spotify:artist:<id>"
        let from_uri = artist
            .uri
            .as_deref()
            .and_then(|uri| uri.rsplit(':').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        from_uri
            .or(artist.id.filter(|id| !id.is_empty()))
            .map(CatalogArtistId)
            .ok_or_else(|| CatalogError::InvalidResponse("track artist has no id".into()))
    }
}

impl ArtistResponse {
    fn into_genres(self) -> Result<Vec<String>, CatalogError> {
        self.genres
            .ok_or_else(|| CatalogError::InvalidResponse("artist has no genres field".into()))
    }
}

impl SpotifyCatalogClient {
    /// Build the client and perform the token exchange.
    ///
    /// Fails if the credentials are rejected: nothing can be enriched without a token.
    pub fn connect(settings: &CatalogSettings, credentials: Credentials) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_sec))
            .build()?;

        let token = request_access_token(&client, &settings.auth_url, &credentials)?;
        info!("Obtained catalog access token");

        let min_request_interval = Duration::from_millis(settings.min_request_interval_ms);
        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            auth_url: settings.auth_url.clone(),
            credentials,
            token: Mutex::new(token),
            min_request_interval,
            max_rate_limit_retries: settings.max_rate_limit_retries,
            last_request: Mutex::new(
                Instant::now()
                    .checked_sub(min_request_interval)
                    .unwrap_or_else(Instant::now),
            ),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn rate_limit(&self) {
        let mut last = lock(&self.last_request);
        let elapsed = last.elapsed();
        if elapsed < self.min_request_interval {
            std::thread::sleep(self.min_request_interval - elapsed);
        }
        *last = Instant::now();
    }

    fn bearer(&self, force_refresh: bool) -> Result<String, CatalogError> {
        let mut token = lock(&self.token);
        if force_refresh || token.is_expired() {
            debug!("Refreshing catalog access token");
            *token = request_access_token(&self.client, &self.auth_url, &self.credentials)?;
        }
        Ok(token.bearer())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let mut rate_limit_retries = 0u32;
        let mut refreshed = false;

        loop {
            self.rate_limit();
            let bearer = self.bearer(false)?;

            let response = self
                .client
                .get(url)
                .header(AUTHORIZATION, bearer)
                .send()
                .map_err(CatalogError::from_transport)?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::from_secs(1))
                    .min(MAX_RETRY_AFTER);

                if rate_limit_retries >= self.max_rate_limit_retries {
                    return Err(CatalogError::RateLimited { retry_after });
                }
                rate_limit_retries += 1;
                warn!(
                    "Catalog rate limit hit, waiting {}s (retry {}/{})",
                    retry_after.as_secs(),
                    rate_limit_retries,
                    self.max_rate_limit_retries
                );
                std::thread::sleep(retry_after);
                continue;
            }

            if status == StatusCode::UNAUTHORIZED && !refreshed {
                refreshed = true;
                self.bearer(true)?;
                continue;
            }

            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(CatalogError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            return response.json::<T>().map_err(|e| {
                CatalogError::InvalidResponse(format!("Failed to parse {}: {}", url, e))
            });
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CatalogClient for SpotifyCatalogClient {
    fn search_track(
        &self,
        artist_name: &str,
        track_name: &str,
    ) -> Result<Option<CatalogTrackId>, CatalogError> {
        let query = format!("artist:{} track:{}", artist_name, track_name);
        let url = format!(
            "{}/search?q={}&type=track&limit=1",
            self.api_base_url,
            urlencoding::encode(&query)
        );
        self.get_json::<SearchResponse>(&url)?.into_track_id()
    }

    fn get_attributes(&self, track_id: &CatalogTrackId) -> Result<TrackAttributes, CatalogError> {
        let url = format!(
            "{}/audio-features/{}",
            self.api_base_url,
            urlencoding::encode(track_id.as_str())
        );
        self.get_json::<AudioFeaturesResponse>(&url)?
            .into_attributes()
    }

    fn get_track_owner(&self, track_id: &CatalogTrackId) -> Result<CatalogArtistId, CatalogError> {
        let url = format!(
            "{}/tracks/{}",
            self.api_base_url,
            urlencoding::encode(track_id.as_str())
        );
        self.get_json::<TrackResponse>(&url)?.into_owner()
    }

    fn get_genres(&self, artist_id: &CatalogArtistId) -> Result<Vec<String>, CatalogError> {
        let url = format!(
            "{}/artists/{}",
            self.api_base_url,
            urlencoding::encode(artist_id.as_str())
        );
        self.get_json::<ArtistResponse>(&url)?.into_genres()
    }
}
