//! Catalog client trait definition.

use super::models::{CatalogRecord, SearchKind, TrackEntry};
use crate::error::DiscoverError;
use async_trait::async_trait;
use thiserror::Error;

/// Opaque bearer token used to talk to the catalog.
///
/// The token is supplied per invocation and never stored by any stage.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Builds a token from an optional raw value. Missing or blank values are
    /// an authentication failure.
    pub fn from_optional(raw: Option<&str>) -> Result<Self, DiscoverError> {
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() => Ok(Self(value.to_string())),
            _ => Err(DiscoverError::Auth("No access token available".to_string())),
        }
    }

    pub fn new(value: impl Into<String>) -> Result<Self, DiscoverError> {
        let value = value.into();
        Self::from_optional(Some(&value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First few characters of the token, safe to put in logs.
    pub fn prefix(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken({}...)", self.prefix())
    }
}

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

// A single failed catalog call is always recoverable, even a 401: the
// credential is checked once up front and sibling calls may still succeed.
impl From<CatalogError> for DiscoverError {
    fn from(err: CatalogError) -> Self {
        DiscoverError::Lookup(err.to_string())
    }
}

/// Read access to an external music catalog.
///
/// Every call is independent; implementations must be safe to call
/// concurrently from many tasks.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Run one search of the given kind and return at most `limit` records.
    async fn search(
        &self,
        token: &AccessToken,
        query: &str,
        kind: SearchKind,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Most popular tracks of an artist in the given market.
    async fn artist_top_tracks(
        &self,
        token: &AccessToken,
        artist_id: &str,
        market: &str,
    ) -> Result<Vec<TrackEntry>, CatalogError>;

    /// First `limit` entries of a playlist.
    async fn playlist_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<TrackEntry>, CatalogError>;

    /// First `limit` entries of an album.
    async fn album_tracks(
        &self,
        token: &AccessToken,
        album_id: &str,
        limit: usize,
    ) -> Result<Vec<TrackEntry>, CatalogError>;
}
