use super::{strip_code_fences, EntityExtractor};
use crate::agent::llm::{CompletionOptions, LlmProvider, Message};
use crate::catalog::RawEntities;
use crate::error::DiscoverError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

const MAX_ITEM_CHARS: usize = 200;
const MAX_ARTIST_CHARS: usize = 100;
const MAX_LIST_ITEMS: usize = 10;
const MAX_PLAYLISTS: usize = 5;
const MAX_USER_PROMPT_CHARS: usize = 2000;

const EXTRACT_INSTRUCTIONS: &str = "Identify the songs, artists, albums and playlists the user \
explicitly names. Reply with only a JSON object of the form \
{\"song_titles\": [], \"artists\": [], \"albums\": [], \"playlists\": [], \"user_prompt\": \"\"} \
where user_prompt repeats the user's entire message. Keep names exactly as written.";

/// Entity extractor backed by an LLM provider.
pub struct LlmEntityExtractor {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LlmEntityExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }
}

#[async_trait]
impl EntityExtractor for LlmEntityExtractor {
    async fn extract(&self, user_input: &str) -> Result<RawEntities, DiscoverError> {
        let messages = [
            Message::system(EXTRACT_INSTRUCTIONS),
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
                warn!(provider = self.provider.name(), error = %err, "Entity extraction failed");
                DiscoverError::Oracle(format!("Entity extraction failed: {}", err))
            })?;

        let reply = strip_code_fences(&response.message.content);
        let extracted: Option<ExtractedEntities> =
            serde_json::from_str(&reply).map_err(|err| {
                warn!(error = %err, reply = %reply, "Entity extraction reply is not valid JSON");
                DiscoverError::Parse(format!("Entity extraction reply: {}", err))
            })?;
        let extracted = extracted.ok_or_else(|| {
            DiscoverError::Oracle("Entity extraction returned nothing".to_string())
        })?;

        let entities = sanitize_entities(extracted.into(), user_input);
        debug!(
            song_titles = entities.song_titles.len(),
            artists = entities.artists.len(),
            albums = entities.albums.len(),
            playlists = entities.playlists.len(),
            "Extracted entities"
        );
        Ok(entities)
    }
}

/// Lenient view of the model's reply: keys may be missing or null.
#[derive(Debug, Deserialize)]
struct ExtractedEntities {
    #[serde(default)]
    song_titles: Option<Vec<String>>,
    #[serde(default)]
    artists: Option<Vec<String>>,
    #[serde(default)]
    albums: Option<Vec<String>>,
    #[serde(default)]
    playlists: Option<Vec<String>>,
    #[serde(default)]
    user_prompt: Option<String>,
}

impl From<ExtractedEntities> for RawEntities {
    fn from(e: ExtractedEntities) -> Self {
        RawEntities {
            song_titles: e.song_titles.unwrap_or_default(),
            artists: e.artists.unwrap_or_default(),
            albums: e.albums.unwrap_or_default(),
            playlists: e.playlists.unwrap_or_default(),
            user_prompt: e.user_prompt.unwrap_or_default(),
        }
    }
}

/// Normalizes extracted entities: trims items, drops blanks, caps item lengths
/// and list sizes, and falls back to the user's input for an empty prompt.
pub fn sanitize_entities(entities: RawEntities, user_input: &str) -> RawEntities {
    let user_prompt = match truncate_chars(entities.user_prompt.trim(), MAX_USER_PROMPT_CHARS) {
        prompt if prompt.is_empty() => {
            truncate_chars(user_input.trim(), MAX_USER_PROMPT_CHARS)
        }
        prompt => prompt,
    };

    RawEntities {
        song_titles: sanitize_list(entities.song_titles, MAX_ITEM_CHARS, MAX_LIST_ITEMS),
        artists: sanitize_list(entities.artists, MAX_ARTIST_CHARS, MAX_LIST_ITEMS),
        albums: sanitize_list(entities.albums, MAX_ITEM_CHARS, MAX_LIST_ITEMS),
        playlists: sanitize_list(entities.playlists, MAX_ITEM_CHARS, MAX_PLAYLISTS),
        user_prompt,
    }
}

fn sanitize_list(items: Vec<String>, max_chars: usize, max_items: usize) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| truncate_chars(item, max_chars))
        .take(max_items)
        .collect()
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ScriptedProvider;
    use super::*;
    use crate::error::ErrorKind;

    fn extractor(provider: ScriptedProvider) -> (LlmEntityExtractor, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        (
            LlmEntityExtractor::new(provider.clone(), CompletionOptions::default()),
            provider,
        )
    }

    #[tokio::test]
    async fn parses_fenced_reply() {
        let (extractor, provider) = extractor(ScriptedProvider::replying(
            "```json\n{\"song_titles\": [\"Blinding Lights\"], \"artists\": [\"The Weeknd\"], \"user_prompt\": \"songs like Blinding Lights\"}\n```",
        ));

        let entities = extractor.extract("songs like Blinding Lights").await.unwrap();

        assert_eq!(entities.song_titles, vec!["Blinding Lights"]);
        assert_eq!(entities.artists, vec!["The Weeknd"]);
        assert!(entities.albums.is_empty());
        assert_eq!(entities.user_prompt, "songs like Blinding Lights");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (messages, json_mode) = &requests[0];
        assert!(*json_mode);
        assert_eq!(messages[1].content, "songs like Blinding Lights");
    }

    #[tokio::test]
    async fn provider_failure_is_oracle_error() {
        let (extractor, _) = extractor(ScriptedProvider::failing());
        let err = extractor.extract("anything").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Oracle);
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn malformed_reply_is_parse_error() {
        let (extractor, _) = extractor(ScriptedProvider::replying("Sure! Here you go: artists"));
        let err = extractor.extract("anything").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn null_reply_is_oracle_error() {
        let (extractor, _) = extractor(ScriptedProvider::replying("null"));
        let err = extractor.extract("anything").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Oracle);
    }

    #[tokio::test]
    async fn null_lists_are_treated_as_empty() {
        let (extractor, _) = extractor(ScriptedProvider::replying(
            r#"{"song_titles": null, "user_prompt": "upbeat pop for running"}"#,
        ));
        let entities = extractor.extract("upbeat pop for running").await.unwrap();
        assert!(entities.song_titles.is_empty());
        assert_eq!(entities.user_prompt, "upbeat pop for running");
    }

    #[test]
    fn sanitize_trims_and_drops_blanks() {
        let entities = RawEntities {
            artists: vec!["  SZA ".into(), "   ".into(), "".into()],
            user_prompt: "  sad songs  ".into(),
            ..Default::default()
        };
        let clean = sanitize_entities(entities, "ignored");
        assert_eq!(clean.artists, vec!["SZA"]);
        assert_eq!(clean.user_prompt, "sad songs");
    }

    #[test]
    fn sanitize_caps_lengths_and_counts() {
        let entities = RawEntities {
            artists: vec!["a".repeat(150)],
            song_titles: (0..15).map(|i| format!("song {}", i)).collect(),
            playlists: (0..8).map(|i| format!("list {}", i)).collect(),
            albums: vec!["b".repeat(250)],
            user_prompt: "p".repeat(2500),
        };
        let clean = sanitize_entities(entities, "ignored");
        assert_eq!(clean.artists[0].chars().count(), MAX_ARTIST_CHARS);
        assert_eq!(clean.albums[0].chars().count(), MAX_ITEM_CHARS);
        assert_eq!(clean.song_titles.len(), MAX_LIST_ITEMS);
        assert_eq!(clean.song_titles[9], "song 9");
        assert_eq!(clean.playlists.len(), MAX_PLAYLISTS);
        assert_eq!(clean.user_prompt.len(), MAX_USER_PROMPT_CHARS);
    }

    #[test]
    fn empty_prompt_falls_back_to_user_input() {
        let entities = RawEntities {
            artists: vec!["Drake".into()],
            ..Default::default()
        };
        let clean = sanitize_entities(entities, "  more like Drake ");
        assert_eq!(clean.user_prompt, "more like Drake");
    }
}
