//! Seed expansion: artists, playlists and albums into candidate tracks.

mod seed_expander;

pub use seed_expander::{SeedExpander, DEFAULT_MARKET, SEED_TRACK_LIMIT};
