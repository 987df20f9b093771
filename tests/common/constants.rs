//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When stub data changes (catalog ids, names, replies), update only this file.

// ============================================================================
// Credentials
// ============================================================================

/// The only access token the stub catalog accepts
pub const TEST_TOKEN: &str = "test-catalog-token";

/// A token the stub catalog rejects with 401
pub const REJECTED_TOKEN: &str = "expired-token";

// ============================================================================
// Stub Catalog Entities
// ============================================================================

pub const TRACK_TITLE: &str = "Get Lucky";
pub const TRACK_ID: &str = "track-get-lucky";

pub const ARTIST_NAME: &str = "Daft Punk";
pub const ARTIST_ID: &str = "artist-daft-punk";

/// Returned by the artist search next to the real artist, never an exact match
pub const LOOKALIKE_ARTIST_NAME: &str = "Daft Punk Tribute Band";
pub const LOOKALIKE_ARTIST_ID: &str = "artist-tribute";

pub const ALBUM_TITLE: &str = "Discovery";
pub const ALBUM_ID: &str = "album-discovery";

pub const PLAYLIST_NAME: &str = "Chill Vibes";
pub const PLAYLIST_ID: &str = "playlist-chill";

/// Top tracks served for the artist, one more than a seed contributes
pub const ARTIST_TOP_TRACK_IDS: [&str; 6] = ["top-1", "top-2", "top-3", "top-4", "top-5", "top-6"];

/// Playlist entries with an id; the stub also serves a null entry between them
pub const PLAYLIST_TRACK_IDS: [&str; 2] = ["pl-1", "pl-2"];

pub const ALBUM_TRACK_IDS: [&str; 3] = ["alb-1", "alb-2", "alb-3"];

/// Similarity matches, best first
pub const MATCH_IDS: [&str; 3] = ["match-1", "match-2", "match-3"];

// ============================================================================
// Requests
// ============================================================================

pub const DISCOVER_PROMPT: &str =
    "Songs like Get Lucky by Daft Punk, the Discovery album and my Chill Vibes playlist, but calmer";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
