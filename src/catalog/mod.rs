//! External music catalog: shared models, client trait and the Spotify Web API client.

mod client;
mod models;
mod spotify;

pub use client::{AccessToken, CatalogClient, CatalogError};
pub use models::*;
pub use spotify::{SpotifyCatalogClient, SPOTIFY_API_BASE};
