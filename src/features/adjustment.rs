//! Structured preference adjustment produced by the interpretation oracle.
//!
//! The oracle's output is untrusted: groups are kept as loose JSON maps here
//! and only become numbers once the vector builder has validated them.

use crate::error::DiscoverError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Features already normalized to [0, 1].
pub const BOUNDED_COLUMNS: [&str; 7] = [
    "danceability",
    "energy",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
];

/// Features rescaled jointly with min-max scaling.
pub const MINMAX_COLUMNS: [&str; 4] = ["tempo", "duration_ms", "time_signature", "key"];

/// Features standardized with z-score scaling.
pub const ZSCORE_COLUMNS: [&str; 1] = ["loudness"];

/// Binary features (major = 1, minor = 0).
pub const MODE_COLUMNS: [&str; 1] = ["mode"];

/// One group of named, loosely typed feature values.
pub type ColumnGroup = BTreeMap<String, Value>;

/// Seed attributes echoed back by the oracle. Informational only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_artists: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_title: Option<Vec<String>>,
}

impl SeedMetadata {
    pub fn is_empty(&self) -> bool {
        self.seed_artists.as_ref().map_or(true, Vec::is_empty)
            && self.seed_title.as_ref().map_or(true, Vec::is_empty)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceAdjustment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SeedMetadata>,
    #[serde(default)]
    pub bounded_cols: Option<ColumnGroup>,
    #[serde(default)]
    pub minmax_cols: Option<ColumnGroup>,
    #[serde(default)]
    pub zscore_cols: Option<ColumnGroup>,
    #[serde(default)]
    pub mode_cols: Option<ColumnGroup>,
}

/// Parses a preference adjustment from JSON text.
///
/// Malformed JSON and a top-level `null` are parse errors; a structurally
/// incomplete object parses fine and is rejected later by validation.
pub fn parse_adjustment(json: &str) -> Result<PreferenceAdjustment, DiscoverError> {
    let parsed: Option<PreferenceAdjustment> = serde_json::from_str(json)
        .map_err(|e| DiscoverError::Parse(format!("Invalid JSON string provided: {}", e)))?;
    parsed.ok_or_else(|| DiscoverError::Parse("Parsed JSON is null".to_string()))
}

/// Reads a feature value as a finite number.
///
/// Accepts JSON numbers and strings holding a number (surrounding whitespace
/// allowed). Empty strings, booleans and non-finite values are rejected.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}
