use super::{strip_code_fences, PreferenceInterpreter};
use crate::agent::llm::{CompletionOptions, LlmProvider, Message};
use crate::catalog::SearchSeedsResult;
use crate::error::DiscoverError;
use crate::features::{
    parse_adjustment, PreferenceAdjustment, SeedMetadata, BOUNDED_COLUMNS, MINMAX_COLUMNS,
    MODE_COLUMNS, ZSCORE_COLUMNS,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Preference interpreter backed by an LLM provider.
pub struct LlmPreferenceInterpreter {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LlmPreferenceInterpreter {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    fn instructions(seed_attributes: Option<&SeedMetadata>) -> String {
        let seeds = seed_attributes
            .and_then(|attrs| serde_json::to_string(attrs).ok())
            .unwrap_or_else(|| "No seed attributes provided".to_string());

        format!(
            "Adjust audio feature targets to match the user's description. \
             Seed attributes: {}. \
             Bounded features are between 0 and 1; mode is 1 for major and 0 for minor. \
             Reply with only a JSON object of this shape, every value a number as a string: {}",
            seeds,
            response_shape()
        )
    }
}

/// Empty JSON template with every expected group and column.
fn response_shape() -> Value {
    fn group(columns: &[&str]) -> Value {
        Value::Object(
            columns
                .iter()
                .map(|c| (c.to_string(), Value::String(String::new())))
                .collect::<Map<String, Value>>(),
        )
    }

    let mut shape = Map::new();
    shape.insert("bounded_cols".to_string(), group(&BOUNDED_COLUMNS));
    shape.insert("minmax_cols".to_string(), group(&MINMAX_COLUMNS));
    shape.insert("zscore_cols".to_string(), group(&ZSCORE_COLUMNS));
    shape.insert("mode_cols".to_string(), group(&MODE_COLUMNS));
    Value::Object(shape)
}

#[async_trait]
impl PreferenceInterpreter for LlmPreferenceInterpreter {
    async fn interpret(
        &self,
        user_input: &str,
        seed_attributes: Option<&SeedMetadata>,
    ) -> Result<PreferenceAdjustment, DiscoverError> {
        let messages = [
            Message::system(Self::instructions(seed_attributes)),
            Message::user(user_input),
        ];
        let options = CompletionOptions {
            json_mode: true,
            ..self.options.clone()
        };

        let response = self
            .provider
            .complete(&messages, &options)
            .await
            .map_err(|err| {
                warn!(provider = self.provider.name(), error = %err, "Preference interpretation failed");
                DiscoverError::Oracle(format!("Preference interpretation failed: {}", err))
            })?;

        let reply = strip_code_fences(&response.message.content);
        let adjustment = parse_adjustment(&reply).map_err(|err| {
            warn!(error = %err, reply = %reply, "Interpretation reply is not a valid adjustment");
            err
        })?;
        debug!("Interpreted preference adjustment");
        Ok(adjustment)
    }
}

/// Seed attributes handed to the interpreter: resolved artist and track names.
/// `None` when there is nothing to anchor on.
pub fn seed_attributes(seeds: &SearchSeedsResult) -> Option<SeedMetadata> {
    let metadata = SeedMetadata {
        seed_artists: Some(seeds.artists.iter().map(|a| a.name.clone()).collect()),
        seed_title: Some(seeds.tracks.iter().map(|t| t.name.clone()).collect()),
    };
    (!metadata.is_empty()).then_some(metadata)
}
