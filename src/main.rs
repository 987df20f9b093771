use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pezzottify_discover::config;
use pezzottify_discover::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3002)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9092)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Base URL of the catalog Web API.
    #[clap(long)]
    pub catalog_base_url: Option<String>,

    /// Timeout in seconds for catalog requests.
    #[clap(long, default_value_t = 15)]
    pub catalog_timeout_sec: u64,

    /// Market used when fetching artist top tracks.
    #[clap(long, default_value = "US")]
    pub market: String,

    /// Maximum number of catalog calls in flight per stage.
    #[clap(long, default_value_t = 8)]
    pub max_concurrent_lookups: usize,

    /// Number of similarity matches returned when the request doesn't ask for a limit.
    #[clap(long, default_value_t = 10)]
    pub default_result_limit: usize,

    /// LLM backend: "ollama" or "openai".
    #[clap(long)]
    pub llm_provider: Option<String>,

    /// Base URL of the LLM backend.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    /// Model used by both oracles.
    #[clap(long)]
    pub llm_model: Option<String>,

    /// URL of the similarity index query endpoint. Matches are skipped if unset.
    #[clap(long)]
    pub similarity_url: Option<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            catalog_base_url: args.catalog_base_url.clone(),
            catalog_timeout_sec: args.catalog_timeout_sec,
            market: args.market.clone(),
            max_concurrent_lookups: args.max_concurrent_lookups,
            default_result_limit: args.default_result_limit,
            llm_provider: args.llm_provider.clone(),
            llm_base_url: args.llm_base_url.clone(),
            llm_model: args.llm_model.clone(),
            similarity_url: args.similarity_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  port: {}", app_config.port);
    info!("  catalog: {}", app_config.catalog_base_url);
    info!("  market: {}", app_config.market);
    info!(
        "  max_concurrent_lookups: {}",
        app_config.max_concurrent_lookups
    );

    info!("Initializing metrics...");
    metrics::init_metrics();

    let orchestrator = Arc::new(app_config.build_orchestrator()?);

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        frontend_dir_path: app_config.frontend_dir_path.clone(),
    };

    run_server(server_config, orchestrator).await
}
