mod file_config;

pub use file_config::{FileConfig, LlmConfig, SimilarityConfig};

use crate::agent::{
    CompletionOptions, LlmEntityExtractor, LlmPreferenceInterpreter, LlmProvider, OllamaProvider,
    OpenAIProvider,
};
use crate::catalog::{CatalogClient, SpotifyCatalogClient, SPOTIFY_API_BASE};
use crate::discover::{PipelineOrchestrator, PipelineSettings};
use crate::expansion::DEFAULT_MARKET;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use crate::similarity::{HttpSimilarityIndex, SimilarityIndex};
use clap::ValueEnum;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub catalog_base_url: Option<String>,
    pub catalog_timeout_sec: u64,
    pub market: String,
    pub max_concurrent_lookups: usize,
    pub default_result_limit: usize,
    pub llm_provider: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub similarity_url: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            metrics_port: 9092,
            logging_level: RequestsLoggingLevel::Path,
            frontend_dir_path: None,
            catalog_base_url: None,
            catalog_timeout_sec: 15,
            market: DEFAULT_MARKET.to_string(),
            max_concurrent_lookups: 8,
            default_result_limit: 10,
            llm_provider: None,
            llm_base_url: None,
            llm_model: None,
            similarity_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Catalog and pipeline
    pub catalog_base_url: String,
    pub catalog_timeout_sec: u64,
    pub market: String,
    pub max_concurrent_lookups: usize,
    pub default_result_limit: usize,

    // Collaborators
    pub llm: LlmSettings,
    pub similarity: Option<SimilaritySettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Ollama,
    OpenAI,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub temperature: f32,
    pub timeout_sec: u64,
}

impl LlmSettings {
    pub fn provider(&self) -> Arc<dyn LlmProvider> {
        match self.provider {
            LlmProviderKind::Ollama => {
                Arc::new(OllamaProvider::new(self.base_url.clone(), self.model.clone()))
            }
            LlmProviderKind::OpenAI => match &self.api_key_command {
                Some(command) => Arc::new(OpenAIProvider::with_key_command(
                    self.base_url.clone(),
                    self.model.clone(),
                    command.clone(),
                )),
                None => Arc::new(OpenAIProvider::new(
                    self.base_url.clone(),
                    self.model.clone(),
                    self.api_key.clone(),
                )),
            },
        }
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_sec),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimilaritySettings {
    pub url: String,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let catalog_base_url = file
            .catalog_base_url
            .or_else(|| cli.catalog_base_url.clone())
            .unwrap_or_else(|| SPOTIFY_API_BASE.to_string());
        let catalog_timeout_sec = file.catalog_timeout_sec.unwrap_or(cli.catalog_timeout_sec);

        let market = file.market.unwrap_or_else(|| cli.market.clone());
        if market.trim().is_empty() {
            bail!("market must not be empty");
        }

        let max_concurrent_lookups = file
            .max_concurrent_lookups
            .unwrap_or(cli.max_concurrent_lookups);
        if max_concurrent_lookups == 0 {
            bail!("max_concurrent_lookups must be at least 1");
        }

        let default_result_limit = file
            .default_result_limit
            .unwrap_or(cli.default_result_limit);
        if default_result_limit == 0 {
            bail!("default_result_limit must be at least 1");
        }

        let llm = resolve_llm(cli, file.llm.unwrap_or_default())?;

        // [similarity] url takes precedence over --similarity-url
        let similarity_file = file.similarity.unwrap_or_default();
        let similarity = similarity_file
            .url
            .or_else(|| cli.similarity_url.clone())
            .map(|url| SimilaritySettings {
                url,
                timeout_sec: similarity_file.timeout_sec.unwrap_or(30),
            });

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            catalog_base_url,
            catalog_timeout_sec,
            market,
            max_concurrent_lookups,
            default_result_limit,
            llm,
            similarity,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            market: self.market.clone(),
            max_concurrent_lookups: self.max_concurrent_lookups,
            default_result_limit: self.default_result_limit,
        }
    }

    /// Assembles the pipeline with its live collaborators: the catalog Web API,
    /// the configured LLM behind both oracles and the optional similarity index.
    pub fn build_orchestrator(&self) -> Result<PipelineOrchestrator> {
        let catalog: Arc<dyn CatalogClient> = Arc::new(SpotifyCatalogClient::new(
            self.catalog_base_url.clone(),
            self.catalog_timeout_sec,
        )?);

        let provider = self.llm.provider();
        info!(
            "Using {} LLM provider with model {}",
            provider.name(),
            provider.model()
        );
        let options = self.llm.completion_options();
        let extractor = Arc::new(LlmEntityExtractor::new(provider.clone(), options.clone()));
        let interpreter = Arc::new(LlmPreferenceInterpreter::new(provider, options));

        let similarity = match &self.similarity {
            Some(settings) => {
                info!("Similarity index configured at {}", settings.url);
                Some(Arc::new(HttpSimilarityIndex::new(&settings.url, settings.timeout_sec)?)
                    as Arc<dyn SimilarityIndex>)
            }
            None => None,
        };

        Ok(PipelineOrchestrator::new(
            catalog,
            extractor,
            interpreter,
            similarity,
            self.pipeline_settings(),
        ))
    }
}

fn resolve_llm(cli: &CliConfig, file: LlmConfig) -> Result<LlmSettings> {
    let provider_name = file
        .provider
        .or_else(|| cli.llm_provider.clone())
        .unwrap_or_else(|| "ollama".to_string());
    let provider = match provider_name.to_lowercase().as_str() {
        "ollama" => LlmProviderKind::Ollama,
        "openai" => LlmProviderKind::OpenAI,
        other => bail!("Unknown LLM provider: {} (expected ollama or openai)", other),
    };

    let base_url = file
        .base_url
        .or_else(|| cli.llm_base_url.clone())
        .unwrap_or_else(|| match provider {
            LlmProviderKind::Ollama => DEFAULT_OLLAMA_URL.to_string(),
            LlmProviderKind::OpenAI => DEFAULT_OPENAI_URL.to_string(),
        });

    let model = match (file.model.or_else(|| cli.llm_model.clone()), provider) {
        (Some(model), _) => model,
        (None, LlmProviderKind::Ollama) => DEFAULT_OLLAMA_MODEL.to_string(),
        (None, LlmProviderKind::OpenAI) => {
            bail!("llm.model must be specified for the openai provider")
        }
    };

    if file.api_key.is_some() && file.api_key_command.is_some() {
        bail!("Only one of llm.api_key and llm.api_key_command can be set");
    }

    Ok(LlmSettings {
        provider,
        base_url,
        model,
        api_key: file.api_key,
        api_key_command: file.api_key_command,
        temperature: file.temperature.unwrap_or(0.0),
        timeout_sec: file.timeout_sec.unwrap_or(120),
    })
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
