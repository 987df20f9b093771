//! Spotify Web API implementation of [`CatalogClient`].
//!
//! Only the read endpoints needed for seed resolution and expansion are
//! covered: search, artist top tracks, playlist tracks and album tracks.

use super::client::{AccessToken, CatalogClient, CatalogError};
use super::models::{
    AlbumRef, ArtistRef, CatalogAlbum, CatalogArtist, CatalogPlaylist, CatalogRecord,
    CatalogTrack, ExternalUrls, PlaylistOwner, SearchKind, TrackEntry,
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// HTTP client for the Spotify Web API.
pub struct SpotifyCatalogClient {
    client: Client,
    base_url: String,
}

impl SpotifyCatalogClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the Web API (e.g., "https://api.spotify.com/v1")
    /// * `timeout_sec` - Per-request timeout in seconds
    pub fn new(base_url: impl Into<String>, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, query = ?query, "Fetching from catalog");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Timeout
                } else {
                    CatalogError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                warn!(
                    token_prefix = %token.prefix(),
                    "Catalog rejected the access token, it may be expired or invalid"
                );
            }
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::InvalidResponse(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl CatalogClient for SpotifyCatalogClient {
    async fn search(
        &self,
        token: &AccessToken,
        query: &str,
        kind: SearchKind,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let params = [
            ("q", query.to_string()),
            ("type", kind.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        let response: SearchResponse = self.get_json(token, "search", &params).await?;
        Ok(response.into_records(kind))
    }

    async fn artist_top_tracks(
        &self,
        token: &AccessToken,
        artist_id: &str,
        market: &str,
    ) -> Result<Vec<TrackEntry>, CatalogError> {
        let path = format!("artists/{}/top-tracks", urlencoding::encode(artist_id));
        let response: TopTracksResponse = self
            .get_json(token, &path, &[("market", market.to_string())])
            .await?;

        Ok(response
            .tracks
            .into_iter()
            .flatten()
            .map(|t| TrackEntry {
                track_id: t.id,
                track_name: t.name,
            })
            .collect())
    }

    async fn playlist_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<TrackEntry>, CatalogError> {
        let path = format!("playlists/{}/tracks", urlencoding::encode(playlist_id));
        let page: Page<WireEntry> = self
            .get_json(token, &path, &[("limit", limit.to_string())])
            .await?;
        Ok(page.entries())
    }

    async fn album_tracks(
        &self,
        token: &AccessToken,
        album_id: &str,
        limit: usize,
    ) -> Result<Vec<TrackEntry>, CatalogError> {
        let path = format!("albums/{}/tracks", urlencoding::encode(album_id));
        let page: Page<WireEntry> = self
            .get_json(token, &path, &[("limit", limit.to_string())])
            .await?;
        Ok(page.entries())
    }
}

// =============================================================================
// Wire models
// =============================================================================

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
}

impl Page<WireEntry> {
    fn entries(self) -> Vec<TrackEntry> {
        self.items
            .into_iter()
            .map(|entry| entry.map(WireEntry::into_entry).unwrap_or_default())
            .collect()
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<Page<WireTrack>>,
    artists: Option<Page<WireArtist>>,
    albums: Option<Page<WireAlbum>>,
    playlists: Option<Page<WirePlaylist>>,
}

impl SearchResponse {
    /// Maps the page matching `kind` into catalog records. Items without an id
    /// are dropped since nothing downstream can reference them.
    fn into_records(self, kind: SearchKind) -> Vec<CatalogRecord> {
        fn flatten<T>(page: Option<Page<T>>) -> impl Iterator<Item = T> {
            page.map(|p| p.items).unwrap_or_default().into_iter().flatten()
        }

        match kind {
            SearchKind::Track => flatten(self.tracks)
                .filter_map(WireTrack::into_record)
                .map(CatalogRecord::Track)
                .collect(),
            SearchKind::Artist => flatten(self.artists)
                .filter_map(WireArtist::into_record)
                .map(CatalogRecord::Artist)
                .collect(),
            SearchKind::Album => flatten(self.albums)
                .filter_map(WireAlbum::into_record)
                .map(CatalogRecord::Album)
                .collect(),
            SearchKind::Playlist => flatten(self.playlists)
                .filter_map(WirePlaylist::into_record)
                .map(CatalogRecord::Playlist)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct TopTracksResponse {
    #[serde(default)]
    tracks: Vec<Option<WireTrack>>,
}

#[derive(Deserialize, Default)]
struct WireExternalUrls {
    spotify: Option<String>,
}

impl From<Option<WireExternalUrls>> for ExternalUrls {
    fn from(urls: Option<WireExternalUrls>) -> Self {
        ExternalUrls {
            spotify: urls.and_then(|u| u.spotify),
        }
    }
}

#[derive(Deserialize)]
struct WireRef {
    id: Option<String>,
    name: Option<String>,
}

impl WireRef {
    fn into_artist_ref(self) -> ArtistRef {
        ArtistRef {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        }
    }

    fn into_album_ref(self) -> AlbumRef {
        AlbumRef {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct WireTrack {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    artists: Vec<WireRef>,
    album: Option<WireRef>,
    uri: Option<String>,
    external_urls: Option<WireExternalUrls>,
}

impl WireTrack {
    fn into_record(self) -> Option<CatalogTrack> {
        Some(CatalogTrack {
            id: self.id?,
            name: self.name.unwrap_or_default(),
            artists: self.artists.into_iter().map(WireRef::into_artist_ref).collect(),
            album: self
                .album
                .map(WireRef::into_album_ref)
                .unwrap_or(AlbumRef {
                    id: String::new(),
                    name: String::new(),
                }),
            uri: self.uri.unwrap_or_default(),
            external_urls: self.external_urls.into(),
        })
    }
}

#[derive(Deserialize)]
struct WireArtist {
    id: Option<String>,
    name: Option<String>,
    uri: Option<String>,
    external_urls: Option<WireExternalUrls>,
    genres: Option<Vec<String>>,
}

impl WireArtist {
    fn into_record(self) -> Option<CatalogArtist> {
        Some(CatalogArtist {
            id: self.id?,
            name: self.name.unwrap_or_default(),
            uri: self.uri.unwrap_or_default(),
            external_urls: self.external_urls.into(),
            genres: self.genres.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct WireAlbum {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    artists: Vec<WireRef>,
    uri: Option<String>,
    external_urls: Option<WireExternalUrls>,
    release_date: Option<String>,
}

impl WireAlbum {
    fn into_record(self) -> Option<CatalogAlbum> {
        Some(CatalogAlbum {
            id: self.id?,
            name: self.name.unwrap_or_default(),
            artists: self.artists.into_iter().map(WireRef::into_artist_ref).collect(),
            uri: self.uri.unwrap_or_default(),
            external_urls: self.external_urls.into(),
            release_date: self.release_date,
        })
    }
}

#[derive(Deserialize)]
struct WireOwner {
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct WireTrackCount {
    total: Option<u32>,
}

#[derive(Deserialize)]
struct WirePlaylist {
    id: Option<String>,
    name: Option<String>,
    owner: Option<WireOwner>,
    uri: Option<String>,
    external_urls: Option<WireExternalUrls>,
    tracks: Option<WireTrackCount>,
}

impl WirePlaylist {
    fn into_record(self) -> Option<CatalogPlaylist> {
        Some(CatalogPlaylist {
            id: self.id?,
            name: self.name.unwrap_or_default(),
            owner: PlaylistOwner {
                display_name: self.owner.and_then(|o| o.display_name),
            },
            uri: self.uri.unwrap_or_default(),
            external_urls: self.external_urls.into(),
            track_count: self.tracks.and_then(|t| t.total).unwrap_or(0),
        })
    }
}

/// Playlist entries wrap the track (`{"track": {...}}`), album listings return
/// simplified tracks directly. Both shapes land here.
#[derive(Deserialize)]
struct WireEntry {
    id: Option<String>,
    name: Option<String>,
    track: Option<WireRef>,
}

impl WireEntry {
    fn into_entry(self) -> TrackEntry {
        match self.track {
            Some(track) => TrackEntry {
                track_id: track.id,
                track_name: track.name,
            },
            None => TrackEntry {
                track_id: self.id,
                track_name: self.name,
            },
        }
    }
}
