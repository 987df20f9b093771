//! Consumer side of the external similarity index.
//!
//! The index itself (and how it is populated) lives outside this service; the
//! discover pipeline only sends a preference vector and reads ranked matches.

mod http;

pub use http::HttpSimilarityIndex;

use crate::error::DiscoverError;
use crate::features::PreferenceVector;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A track returned by the similarity index, best matches first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrack {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

impl From<SimilarityError> for DiscoverError {
    fn from(err: SimilarityError) -> Self {
        DiscoverError::Oracle(format!("Similarity query failed: {}", err))
    }
}

#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Return at most `limit` tracks ranked by similarity to `vector`.
    async fn query(
        &self,
        vector: &PreferenceVector,
        limit: usize,
    ) -> Result<Vec<ScoredTrack>, SimilarityError>;
}
