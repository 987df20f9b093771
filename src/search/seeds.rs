//! Resolution of extracted entities into catalog seeds.
//!
//! Every requested song title, artist, album and playlist becomes one catalog
//! search. Searches within a category run concurrently (bounded by
//! `max_concurrent_lookups`) and the four categories run concurrently with each
//! other. A failed search only loses its own contribution.

use super::normalizer::{clean, clean_non_empty};
use crate::catalog::{
    AccessToken, CatalogArtist, CatalogClient, CatalogRecord, HasCatalogId, RawEntities,
    ResultTuple, SearchKind, SearchSeedsResult,
};
use crate::error::DiscoverError;
use crate::server::metrics;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of results requested from every catalog search.
pub const SEARCH_PAGE_SIZE: usize = 5;

pub struct CatalogSearchEngine {
    client: Arc<dyn CatalogClient>,
    max_concurrent_lookups: usize,
}

impl CatalogSearchEngine {
    pub fn new(client: Arc<dyn CatalogClient>, max_concurrent_lookups: usize) -> Self {
        Self {
            client,
            max_concurrent_lookups: max_concurrent_lookups.max(1),
        }
    }

    /// Resolve the extracted entities into a deduplicated seed set.
    ///
    /// Fails only when no credential is available; that check happens before
    /// any search is issued. Individual search failures are logged and skipped.
    pub async fn search(
        &self,
        entities: &RawEntities,
        token: Option<&AccessToken>,
    ) -> Result<ResultTuple, DiscoverError> {
        let token =
            token.ok_or_else(|| DiscoverError::Auth("No access token available".to_string()))?;

        let (tracks, artists, albums, playlists) = tokio::join!(
            self.search_kind(token, entities.items(SearchKind::Track), SearchKind::Track),
            self.search_kind(token, entities.items(SearchKind::Artist), SearchKind::Artist),
            self.search_kind(token, entities.items(SearchKind::Album), SearchKind::Album),
            self.search_kind(token, entities.items(SearchKind::Playlist), SearchKind::Playlist),
        );

        let mut result = SearchSeedsResult {
            tracks: dedupe_by_id(
                tracks
                    .into_iter()
                    .filter_map(|r| match r {
                        CatalogRecord::Track(t) => Some(t),
                        _ => None,
                    })
                    .collect(),
            ),
            artists: dedupe_by_id(
                artists
                    .into_iter()
                    .filter_map(|r| match r {
                        CatalogRecord::Artist(a) => Some(a),
                        _ => None,
                    })
                    .collect(),
            ),
            albums: dedupe_by_id(
                albums
                    .into_iter()
                    .filter_map(|r| match r {
                        CatalogRecord::Album(a) => Some(a),
                        _ => None,
                    })
                    .collect(),
            ),
            playlists: dedupe_by_id(
                playlists
                    .into_iter()
                    .filter_map(|r| match r {
                        CatalogRecord::Playlist(p) => Some(p),
                        _ => None,
                    })
                    .collect(),
            ),
        };

        info!(
            tracks = result.tracks.len(),
            artists = result.artists.len(),
            albums = result.albums.len(),
            playlists = result.playlists.len(),
            "Search complete"
        );
        if !result.artists.is_empty() {
            let names: Vec<&str> = result.artists.iter().map(|a| a.name.as_str()).collect();
            info!("Found artists: {}", names.join(", "));
        }

        result.artists = filter_exact_artists(result.artists, &entities.artists);

        Ok((result, entities.user_prompt.clone()))
    }

    /// Runs one search per non-blank item of a category and concatenates the
    /// results in submission order.
    async fn search_kind(
        &self,
        token: &AccessToken,
        items: &[String],
        kind: SearchKind,
    ) -> Vec<CatalogRecord> {
        let queries: Vec<String> = items
            .iter()
            .filter(|item| !item.trim().is_empty())
            .filter_map(|item| match clean_non_empty(item) {
                // The prefix alone ("track:") survives cleaning, so emptiness
                // is judged on the item.
                Some(_) => Some(clean(&kind.build_query(item))),
                None => {
                    warn!(item = %item, kind = %kind, "Empty query after cleaning, skipping");
                    None
                }
            })
            .collect();

        if queries.is_empty() {
            return Vec::new();
        }

        stream::iter(queries)
            .map(|query| async move { self.search_one(token, query, kind).await })
            .buffered(self.max_concurrent_lookups)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn search_one(
        &self,
        token: &AccessToken,
        query: String,
        kind: SearchKind,
    ) -> Vec<CatalogRecord> {
        debug!(query = %query, kind = %kind, "Searching catalog");

        match self
            .client
            .search(token, &query, kind, SEARCH_PAGE_SIZE)
            .await
        {
            Ok(records) => {
                metrics::record_catalog_lookup(kind.as_str(), "success");
                records
                    .into_iter()
                    .filter(|r| r.kind() == kind)
                    .take(SEARCH_PAGE_SIZE)
                    .collect()
            }
            Err(err) => {
                metrics::record_catalog_lookup(kind.as_str(), "failure");
                let err: DiscoverError = err.into();
                warn!(query = %query, kind = %kind, error = %err, "Catalog search failed");
                Vec::new()
            }
        }
    }
}

/// Removes records whose id was already seen, keeping first-seen order.
pub fn dedupe_by_id<T: HasCatalogId>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.catalog_id().to_string()))
        .collect()
}

/// Keeps only the artists whose name case-insensitively equals one of the
/// requested artist names. Narrows the fuzzy catalog search back to what the
/// user actually asked for.
pub fn filter_exact_artists(
    artists: Vec<CatalogArtist>,
    requested: &[String],
) -> Vec<CatalogArtist> {
    let requested: HashSet<String> = requested
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();

    artists
        .into_iter()
        .filter(|artist| requested.contains(&artist.name.to_lowercase()))
        .collect()
}
