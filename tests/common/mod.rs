//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, DISCOVER_PROMPT};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_discover() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::authenticated(server.base_url.clone());
//!
//!     let response = client.discover(DISCOVER_PROMPT).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
pub mod fixtures;
mod server;
mod stubs;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;
#[allow(unused_imports)]
pub use stubs::{RecordedRequest, StubOptions, StubServices};
