//! Catalog models shared by the search, expansion and discover stages.
//!
//! These are plain value objects: every stage receives them by value or by
//! reference from the orchestrator and none of them is cached across requests.

use serde::{Deserialize, Serialize};

// =============================================================================
// References and links
// =============================================================================

/// Links to the catalog's own web player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<String>,
}

/// Lightweight artist reference embedded in tracks and albums.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// Lightweight album reference embedded in tracks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub display_name: Option<String>,
}

// =============================================================================
// Catalog records
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    pub uri: String,
    pub external_urls: ExternalUrls,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub external_urls: ExternalUrls,
    pub genres: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAlbum {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub uri: String,
    pub external_urls: ExternalUrls,
    pub release_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlaylist {
    pub id: String,
    pub name: String,
    pub owner: PlaylistOwner,
    pub uri: String,
    pub external_urls: ExternalUrls,
    pub track_count: u32,
}

/// A single item returned by a catalog search, tagged by its kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatalogRecord {
    Track(CatalogTrack),
    Artist(CatalogArtist),
    Album(CatalogAlbum),
    Playlist(CatalogPlaylist),
}

impl CatalogRecord {
    pub fn id(&self) -> &str {
        match self {
            CatalogRecord::Track(t) => &t.id,
            CatalogRecord::Artist(a) => &a.id,
            CatalogRecord::Album(a) => &a.id,
            CatalogRecord::Playlist(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogRecord::Track(t) => &t.name,
            CatalogRecord::Artist(a) => &a.name,
            CatalogRecord::Album(a) => &a.name,
            CatalogRecord::Playlist(p) => &p.name,
        }
    }

    pub fn kind(&self) -> SearchKind {
        match self {
            CatalogRecord::Track(_) => SearchKind::Track,
            CatalogRecord::Artist(_) => SearchKind::Artist,
            CatalogRecord::Album(_) => SearchKind::Album,
            CatalogRecord::Playlist(_) => SearchKind::Playlist,
        }
    }
}

/// Anything that carries a stable catalog id.
pub trait HasCatalogId {
    fn catalog_id(&self) -> &str;
}

impl HasCatalogId for CatalogTrack {
    fn catalog_id(&self) -> &str {
        &self.id
    }
}

impl HasCatalogId for CatalogArtist {
    fn catalog_id(&self) -> &str {
        &self.id
    }
}

impl HasCatalogId for CatalogAlbum {
    fn catalog_id(&self) -> &str {
        &self.id
    }
}

impl HasCatalogId for CatalogPlaylist {
    fn catalog_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Search kinds
// =============================================================================

/// The four searchable catalog categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Track,
    Artist,
    Album,
    Playlist,
}

impl SearchKind {
    /// Value of the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Track => "track",
            SearchKind::Artist => "artist",
            SearchKind::Album => "album",
            SearchKind::Playlist => "playlist",
        }
    }

    /// Field filter prefix for this kind. Playlist search does not support
    /// field filters, so playlists are searched as plain text.
    pub fn field_filter(&self) -> Option<&'static str> {
        match self {
            SearchKind::Track => Some("track:"),
            SearchKind::Artist => Some("artist:"),
            SearchKind::Album => Some("album:"),
            SearchKind::Playlist => None,
        }
    }

    /// Builds the raw (not yet cleaned) query for a requested item.
    pub fn build_query(&self, item: &str) -> String {
        match self.field_filter() {
            Some(prefix) => format!("{}{}", prefix, item),
            None => item.to_string(),
        }
    }
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pipeline values
// =============================================================================

/// Entities pulled out of the user's free text by the extraction oracle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntities {
    #[serde(default)]
    pub song_titles: Vec<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub albums: Vec<String>,
    #[serde(default)]
    pub playlists: Vec<String>,
    #[serde(default)]
    pub user_prompt: String,
}

impl RawEntities {
    /// The requested items of one category, in submission order.
    pub fn items(&self, kind: SearchKind) -> &[String] {
        match kind {
            SearchKind::Track => &self.song_titles,
            SearchKind::Artist => &self.artists,
            SearchKind::Album => &self.albums,
            SearchKind::Playlist => &self.playlists,
        }
    }
}

/// Resolved seed set for one discover request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSeedsResult {
    pub tracks: Vec<CatalogTrack>,
    pub artists: Vec<CatalogArtist>,
    pub albums: Vec<CatalogAlbum>,
    pub playlists: Vec<CatalogPlaylist>,
}

impl SearchSeedsResult {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.tracks.len() + self.artists.len() + self.albums.len() + self.playlists.len()
    }

    pub fn artist_ids(&self) -> Vec<String> {
        self.artists.iter().map(|a| a.id.clone()).collect()
    }

    pub fn album_ids(&self) -> Vec<String> {
        self.albums.iter().map(|a| a.id.clone()).collect()
    }

    pub fn playlist_ids(&self) -> Vec<String> {
        self.playlists.iter().map(|p| p.id.clone()).collect()
    }
}

/// Seed set paired with the user's original free-text prompt.
pub type ResultTuple = (SearchSeedsResult, String);

/// Track ids produced by seed expansion. May contain duplicates.
pub type CandidateTrackSet = Vec<String>;

/// One entry of a top-tracks, playlist or album listing.
///
/// Playlist entries may point at removed or local tracks, in which case the
/// catalog returns no track id at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackEntry {
    pub track_id: Option<String>,
    pub track_name: Option<String>,
}

impl TrackEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            track_id: Some(id.into()),
            track_name: Some(name.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
