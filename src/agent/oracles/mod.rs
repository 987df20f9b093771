//! Oracles: external, untrusted producers of pipeline inputs.
//!
//! The extractor turns free text into raw entities; the interpreter turns free
//! text plus seed attributes into a preference adjustment. An unreachable or
//! empty-handed oracle is an `Oracle` error; a reply that isn't the expected
//! JSON is a `Parse` error.

mod extractor;
mod interpreter;

pub use extractor::{sanitize_entities, LlmEntityExtractor};
pub use interpreter::{seed_attributes, LlmPreferenceInterpreter};

use crate::catalog::RawEntities;
use crate::error::DiscoverError;
use crate::features::{PreferenceAdjustment, SeedMetadata};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Extract music entities from the user's free text.
    async fn extract(&self, user_input: &str) -> Result<RawEntities, DiscoverError>;
}

#[async_trait]
pub trait PreferenceInterpreter: Send + Sync {
    /// Interpret the user's free text into a preference adjustment, optionally
    /// anchored on the attributes of the resolved seeds.
    async fn interpret(
        &self,
        user_input: &str,
        seed_attributes: Option<&SeedMetadata>,
    ) -> Result<PreferenceAdjustment, DiscoverError>;
}

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```(?:json)?").unwrap();
}

/// Removes Markdown code fences models like to wrap JSON replies in.
pub fn strip_code_fences(reply: &str) -> String {
    CODE_FENCE.replace_all(reply.trim(), "").trim().to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[]\n```  "), "[]");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }
}
