//! Canned payloads served by the stub services

use super::constants::*;
use serde_json::{json, Value};

fn external_urls(kind: &str, id: &str) -> Value {
    json!({ "spotify": format!("https://open.spotify.com/{}/{}", kind, id) })
}

fn track(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{ "id": ARTIST_ID, "name": ARTIST_NAME }],
        "album": { "id": ALBUM_ID, "name": ALBUM_TITLE },
        "uri": format!("spotify:track:{}", id),
        "external_urls": external_urls("track", id),
    })
}

fn artist(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "uri": format!("spotify:artist:{}", id),
        "external_urls": external_urls("artist", id),
        "genres": ["french house"],
    })
}

/// Body of `GET /search` for the given `type` parameter.
pub fn search_response(kind: &str) -> Value {
    match kind {
        "track" => json!({ "tracks": { "items": [track(TRACK_ID, TRACK_TITLE)] } }),
        "artist" => json!({
            "artists": { "items": [
                artist(ARTIST_ID, ARTIST_NAME),
                artist(LOOKALIKE_ARTIST_ID, LOOKALIKE_ARTIST_NAME),
            ] }
        }),
        "album" => json!({
            "albums": { "items": [{
                "id": ALBUM_ID,
                "name": ALBUM_TITLE,
                "artists": [{ "id": ARTIST_ID, "name": ARTIST_NAME }],
                "uri": format!("spotify:album:{}", ALBUM_ID),
                "external_urls": external_urls("album", ALBUM_ID),
                "release_date": "2001-03-12",
            }] }
        }),
        "playlist" => json!({
            "playlists": { "items": [
                null,
                {
                    "id": PLAYLIST_ID,
                    "name": PLAYLIST_NAME,
                    "owner": { "display_name": "lofi fan" },
                    "uri": format!("spotify:playlist:{}", PLAYLIST_ID),
                    "external_urls": external_urls("playlist", PLAYLIST_ID),
                    "tracks": { "total": 120 },
                },
            ] }
        }),
        _ => json!({}),
    }
}

pub fn artist_top_tracks_response() -> Value {
    let tracks: Vec<Value> = ARTIST_TOP_TRACK_IDS
        .iter()
        .map(|id| track(id, &format!("Top track {}", id)))
        .collect();
    json!({ "tracks": tracks })
}

pub fn playlist_tracks_response() -> Value {
    json!({ "items": [
        { "track": { "id": PLAYLIST_TRACK_IDS[0], "name": "Lo-fi one" } },
        { "track": null },
        { "track": { "id": PLAYLIST_TRACK_IDS[1], "name": "Lo-fi two" } },
    ] })
}

pub fn album_tracks_response() -> Value {
    let items: Vec<Value> = ALBUM_TRACK_IDS
        .iter()
        .enumerate()
        .map(|(i, id)| json!({ "id": id, "name": format!("Album track {}", i + 1) }))
        .collect();
    json!({ "items": items })
}

/// Extraction oracle reply naming one entity of each kind.
pub fn entities_reply(user_prompt: &str) -> Value {
    json!({
        "song_titles": [TRACK_TITLE],
        "artists": [ARTIST_NAME],
        "albums": [ALBUM_TITLE],
        "playlists": [PLAYLIST_NAME],
        "user_prompt": user_prompt,
    })
}

/// Interpretation oracle reply, values as strings the way models tend to answer.
pub fn adjustment_reply() -> Value {
    json!({
        "bounded_cols": {
            "danceability": "0.6",
            "energy": "0.35",
            "speechiness": "0.04",
            "acousticness": "0.3",
            "instrumentalness": "0.2",
            "liveness": "0.1",
            "valence": "0.55",
        },
        "minmax_cols": {
            "tempo": "100",
            "duration_ms": "240000",
            "time_signature": "4",
            "key": "6",
        },
        "zscore_cols": { "loudness": "-9.5" },
        "mode_cols": { "mode": "1" },
    })
}

pub fn similarity_response() -> Value {
    let matches: Vec<Value> = MATCH_IDS
        .iter()
        .enumerate()
        .map(|(i, id)| json!({ "id": id, "score": 0.9 - i as f64 * 0.1 }))
        .collect();
    json!({ "matches": matches })
}
