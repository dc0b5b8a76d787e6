//! External music-catalog lookup
//!
//! The coordinator never stores catalog data of its own: a track's
//! opaque `source_ref` is resolved to title/artist/duration/artwork
//! through this narrow seam at the moment a track is added or
//! proposed. Resolution happens *before* the per-session lock is
//! taken — catalog I/O must never hold up other mutations.

use chorus_common::model::TrackMetadata;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};

/// Catalog lookup backends
pub enum Catalog {
    Http(HttpCatalog),
    Fixture(FixtureCatalog),
}

impl Catalog {
    /// Resolve a source reference to track metadata
    pub async fn resolve(&self, source_ref: &str) -> Result<TrackMetadata> {
        match self {
            Catalog::Http(catalog) => catalog.resolve(source_ref).await,
            Catalog::Fixture(catalog) => catalog.resolve(source_ref),
        }
    }
}

/// Wire format of the catalog service's track endpoint
#[derive(Debug, Deserialize)]
struct CatalogTrackResponse {
    title: String,
    artist: String,
    duration_ms: u64,
    artwork_url: Option<String>,
}

/// HTTP catalog client
///
/// Expects `GET {base_url}/tracks/{source_ref}` returning JSON with
/// title, artist, duration_ms, and optional artwork_url.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn resolve(&self, source_ref: &str) -> Result<TrackMetadata> {
        let url = format!("{}/tracks/{}", self.base_url, source_ref);
        debug!("Resolving catalog reference: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("catalog request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Catalog(format!(
                "catalog returned {} for {}",
                response.status(),
                source_ref
            )));
        }

        let track: CatalogTrackResponse = response
            .json()
            .await
            .map_err(|e| Error::Catalog(format!("invalid catalog response: {}", e)))?;

        Ok(TrackMetadata {
            title: track.title,
            artist: track.artist,
            duration_ms: track.duration_ms,
            artwork_url: track.artwork_url,
        })
    }
}

/// In-memory catalog used by tests and as the offline fallback when
/// no catalog service is configured
///
/// Unknown references resolve to placeholder metadata derived from
/// the reference itself, so a session stays usable without a catalog.
#[derive(Default)]
pub struct FixtureCatalog {
    entries: HashMap<String, TrackMetadata>,
}

impl FixtureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, source_ref: &str, meta: TrackMetadata) -> Self {
        self.entries.insert(source_ref.to_string(), meta);
        self
    }

    pub fn resolve(&self, source_ref: &str) -> Result<TrackMetadata> {
        if let Some(meta) = self.entries.get(source_ref) {
            return Ok(meta.clone());
        }

        Ok(TrackMetadata {
            title: source_ref.to_string(),
            artist: "Unknown Artist".to_string(),
            duration_ms: 0,
            artwork_url: None,
        })
    }
}
