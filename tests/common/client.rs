//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides methods for the discover endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client carrying an optional catalog token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    token: Option<String>,
}

impl TestClient {
    /// Creates a client that sends no catalog token
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client sending the token the stub catalog accepts
    pub fn authenticated(base_url: String) -> Self {
        Self::with_token(base_url, TEST_TOKEN)
    }

    pub fn with_token(base_url: String, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::new(base_url)
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Discover
    // ========================================================================

    /// POST /v1/discover
    pub async fn discover(&self, query: &str) -> Response {
        self.discover_raw(json!({ "query": query })).await
    }

    /// POST /v1/discover with a result limit
    pub async fn discover_with_limit(&self, query: &str, limit: usize) -> Response {
        self.discover_raw(json!({ "query": query, "limit": limit }))
            .await
    }

    /// POST /v1/discover with an arbitrary body
    pub async fn discover_raw(&self, body: Value) -> Response {
        self.post("/v1/discover")
            .json(&body)
            .send()
            .await
            .expect("Discover request failed")
    }

    // ========================================================================
    // Vector
    // ========================================================================

    /// POST /v1/vector
    pub async fn vector(&self, adjustment: Value) -> Response {
        self.post("/v1/vector")
            .json(&adjustment)
            .send()
            .await
            .expect("Vector request failed")
    }

    /// POST /v1/vector with a raw, possibly malformed, body
    pub async fn vector_raw(&self, body: &str) -> Response {
        self.post("/v1/vector")
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Vector request failed")
    }
}
