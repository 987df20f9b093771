//! Pezzottify Discover Library
//!
//! Turns a free-text music request into catalog seeds, candidate tracks and a
//! 13-dimension preference vector. Modules are exposed for the binaries and
//! for end-to-end testing.

pub mod agent;
pub mod catalog;
pub mod config;
pub mod discover;
pub mod error;
pub mod expansion;
pub mod features;
pub mod search;
pub mod server;
pub mod similarity;

// Re-export commonly used types for convenience
pub use catalog::{AccessToken, CatalogClient, RawEntities, SearchSeedsResult, SpotifyCatalogClient};
pub use discover::{DiscoverOutcome, PipelineOrchestrator, PipelineSettings, PipelineStage};
pub use error::{DiscoverError, ErrorKind};
pub use features::PreferenceVector;
pub use server::{run_server, RequestsLoggingLevel};
