//! Expansion of resolved seeds into concrete candidate track ids.

use crate::catalog::{AccessToken, CandidateTrackSet, CatalogClient, ResultTuple, TrackEntry};
use crate::catalog::CatalogError;
use crate::error::DiscoverError;
use crate::server::metrics;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of tracks taken from each seed.
pub const SEED_TRACK_LIMIT: usize = 5;

/// Default market for artist top tracks.
pub const DEFAULT_MARKET: &str = "US";

pub struct SeedExpander {
    client: Arc<dyn CatalogClient>,
    market: String,
    max_concurrent_lookups: usize,
}

impl SeedExpander {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        market: impl Into<String>,
        max_concurrent_lookups: usize,
    ) -> Self {
        Self {
            client,
            market: market.into(),
            max_concurrent_lookups: max_concurrent_lookups.max(1),
        }
    }

    /// Expand artist, playlist and album seeds into candidate track ids.
    ///
    /// Output order is artist tracks, then playlist tracks, then album tracks;
    /// within each phase ids follow seed order. Duplicates are kept.
    pub async fn expand(
        &self,
        seeds: &ResultTuple,
        token: Option<&AccessToken>,
    ) -> Result<CandidateTrackSet, DiscoverError> {
        let token =
            token.ok_or_else(|| DiscoverError::Auth("No access token available".to_string()))?;
        let (result, _) = seeds;

        let artist_ids = result.artist_ids();
        let playlist_ids = result.playlist_ids();
        let album_ids = result.album_ids();

        let (from_artists, from_playlists, from_albums) = tokio::join!(
            self.run_phase("artist_top_tracks", &artist_ids, |id| async move {
                self.client
                    .artist_top_tracks(token, &id, &self.market)
                    .await
            }),
            self.run_phase("playlist_tracks", &playlist_ids, |id| async move {
                self.client
                    .playlist_tracks(token, &id, SEED_TRACK_LIMIT)
                    .await
            }),
            self.run_phase("album_tracks", &album_ids, |id| async move {
                self.client.album_tracks(token, &id, SEED_TRACK_LIMIT).await
            }),
        );

        info!(
            from_artists = from_artists.len(),
            from_playlists = from_playlists.len(),
            from_albums = from_albums.len(),
            "Seed expansion complete"
        );

        let mut candidates = from_artists;
        candidates.extend(from_playlists);
        candidates.extend(from_albums);
        Ok(candidates)
    }

    /// Fetches the entries of every seed in one phase, keeping at most
    /// `SEED_TRACK_LIMIT` per seed and dropping entries without a track id.
    async fn run_phase<F, Fut>(&self, phase: &'static str, ids: &[String], fetch: F) -> Vec<String>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Vec<TrackEntry>, CatalogError>>,
    {
        if ids.is_empty() {
            return Vec::new();
        }

        let fetch = &fetch;
        stream::iter(ids.iter().cloned())
            .map(|id| async move {
                debug!(phase, seed_id = %id, "Expanding seed");
                match fetch(id.clone()).await {
                    Ok(entries) => {
                        metrics::record_catalog_lookup(phase, "success");
                        track_ids(entries)
                    }
                    Err(err) => {
                        metrics::record_catalog_lookup(phase, "failure");
                        warn!(phase, seed_id = %id, error = %err, "Seed expansion lookup failed");
                        Vec::new()
                    }
                }
            })
            .buffered(self.max_concurrent_lookups)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

fn track_ids(entries: Vec<TrackEntry>) -> Vec<String> {
    entries
        .into_iter()
        .take(SEED_TRACK_LIMIT)
        .filter_map(|entry| entry.track_id)
        .collect()
}
