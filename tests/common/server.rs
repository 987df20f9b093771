//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated discover server wired to its own stub upstreams.

use super::constants::*;
use super::stubs::{StubOptions, StubServices};
use pezzottify_discover::config::{AppConfig, CliConfig, FileConfig, LlmConfig, SimilarityConfig};
use pezzottify_discover::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance with its own stub upstreams
///
/// When dropped, the server gracefully shuts down and the stubs stop.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Stub catalog, LLM and similarity index behind the server
    pub stubs: StubServices,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with well-behaved upstreams
    pub async fn spawn() -> Self {
        Self::spawn_with(StubOptions::default(), true).await
    }

    /// Spawns a test server without a similarity index configured
    pub async fn spawn_without_similarity() -> Self {
        Self::spawn_with(StubOptions::default(), false).await
    }

    /// Spawns a new test server
    ///
    /// This function:
    /// 1. Starts the stub upstreams on a random port
    /// 2. Resolves an app config pointing every collaborator at the stubs
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if any of the steps above fails.
    pub async fn spawn_with(options: StubOptions, with_similarity: bool) -> Self {
        let stubs = StubServices::spawn(options).await;

        let file_config = FileConfig {
            catalog_base_url: Some(stubs.catalog_url()),
            catalog_timeout_sec: Some(5),
            max_concurrent_lookups: Some(2),
            llm: Some(LlmConfig {
                provider: Some("ollama".to_string()),
                base_url: Some(stubs.llm_url()),
                model: Some("stub-model".to_string()),
                timeout_sec: Some(5),
                ..Default::default()
            }),
            similarity: with_similarity.then(|| SimilarityConfig {
                url: Some(stubs.similarity_url()),
                timeout_sec: Some(5),
            }),
            ..Default::default()
        };
        let app_config = AppConfig::resolve(&CliConfig::default(), Some(file_config))
            .expect("Failed to resolve test config");
        let orchestrator = Arc::new(
            app_config
                .build_orchestrator()
                .expect("Failed to build orchestrator"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            ..Default::default()
        };
        let app = make_app(config, orchestrator).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            stubs,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
