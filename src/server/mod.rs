pub mod config;
mod credentials;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use credentials::{CatalogCredentials, HEADER_CATALOG_TOKEN_KEY};
pub use http_layers::*;
pub use server::{make_app, make_metrics_app, run_server};
