//! HTTP client for a similarity index service.

use super::{ScoredTrack, SimilarityError, SimilarityIndex};
use crate::features::PreferenceVector;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Similarity index reached over HTTP.
///
/// Sends `POST {url}` with `{"vector": [...13 floats], "limit": n}` and expects
/// `{"matches": [{"id", "score", "metadata"}]}` back.
pub struct HttpSimilarityIndex {
    client: Client,
    url: String,
}

impl HttpSimilarityIndex {
    pub fn new(url: &str, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f64],
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredTrack>,
}

#[async_trait]
impl SimilarityIndex for HttpSimilarityIndex {
    async fn query(
        &self,
        vector: &PreferenceVector,
        limit: usize,
    ) -> Result<Vec<ScoredTrack>, SimilarityError> {
        debug!(url = %self.url, limit, "Querying similarity index");

        let response = self
            .client
            .post(&self.url)
            .json(&QueryRequest {
                vector: vector.as_slice(),
                limit,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SimilarityError::Timeout
                } else {
                    SimilarityError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SimilarityError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| SimilarityError::InvalidResponse(e.to_string()))?;

        let mut matches = parsed.matches;
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let index = HttpSimilarityIndex::new("http://localhost:8000/query", 30);
        assert!(index.is_ok());
    }

    #[test]
    fn test_trailing_slash_removal() {
        let index = HttpSimilarityIndex::new("http://localhost:8000/query/", 30).unwrap();
        assert_eq!(index.url(), "http://localhost:8000/query");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: QueryResponse = serde_json::from_str(
            r#"{"matches": [{"id": "t1", "score": 0.93}, {"id": "t2", "score": 0.9, "metadata": {"name": "Two"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.matches.len(), 2);
        assert!(parsed.matches[0].metadata.is_null());
        assert_eq!(parsed.matches[1].metadata["name"], "Two");

        let empty: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.matches.is_empty());
    }
}
