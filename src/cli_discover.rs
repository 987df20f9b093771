use anyhow::{bail, Context, Result};
use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pezzottify_discover::catalog::AccessToken;
use pezzottify_discover::config::{AppConfig, CliConfig, FileConfig};
use pezzottify_discover::features;

fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

/// Runs the discover pipeline once and prints the outcome as JSON.
#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Free-text music request, e.g. "songs like Bohemian Rhapsody but calmer".
    #[clap(required_unless_present = "vector_only")]
    pub prompt: Option<String>,

    /// Catalog access token.
    #[clap(long, env = "CATALOG_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to TOML configuration file, same format as the server's.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Number of similarity matches to return.
    #[clap(long)]
    pub limit: Option<usize>,

    /// Build a vector from a preference-adjustment JSON file and exit.
    /// No network access is needed.
    #[clap(long, conflicts_with = "prompt")]
    pub vector_only: Option<PathBuf>,
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_vector(path: &PathBuf) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read adjustment file: {:?}", path))?;
    let vector = features::build_from_json(&json)?;
    print_json(&serde_json::json!({ "vector": vector }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // stdout carries the JSON result, logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    if let Some(path) = &cli_args.vector_only {
        return build_vector(path);
    }

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&CliConfig::default(), file_config)?;
    let orchestrator = app_config.build_orchestrator()?;

    let prompt = cli_args.prompt.as_deref().unwrap_or_default();
    let token = AccessToken::from_optional(cli_args.token.as_deref()).ok();
    let outcome = orchestrator
        .discover(prompt, token.as_ref(), cli_args.limit)
        .await;

    print_json(&outcome)?;
    if !outcome.success {
        bail!("Discover failed at stage {}", outcome.stage);
    }
    Ok(())
}
