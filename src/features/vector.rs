//! Compilation of a preference adjustment into a normalized feature vector.

use super::adjustment::{
    numeric_value, parse_adjustment, ColumnGroup, PreferenceAdjustment, BOUNDED_COLUMNS,
    MINMAX_COLUMNS, MODE_COLUMNS, ZSCORE_COLUMNS,
};
use crate::error::DiscoverError;
use serde::Serialize;
use tracing::debug;

pub const VECTOR_LEN: usize = 13;

/// Column names in vector order.
pub const VECTOR_COLUMNS: [&str; VECTOR_LEN] = [
    "danceability",
    "energy",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_ms",
    "time_signature",
    "key",
    "loudness",
    "mode",
];

/// Ordered 13-float feature vector: bounded, min-max, z-score, mode.
///
/// Serializes as a flat JSON array. Only `build` produces one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PreferenceVector([f64; VECTOR_LEN]);

impl PreferenceVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Value of a named column, if the name is known.
    pub fn get(&self, column: &str) -> Option<f64> {
        VECTOR_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.0[i])
    }
}

impl From<PreferenceVector> for Vec<f64> {
    fn from(vector: PreferenceVector) -> Self {
        vector.0.to_vec()
    }
}

// =============================================================================
// Scaling
// =============================================================================

/// Rescales the values jointly to [0, 1] using their own min and max.
/// A single value, or values that are all equal, map to 0.5.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    if values.len() == 1 {
        return vec![0.5];
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    values
        .iter()
        .map(|v| if range == 0.0 { 0.5 } else { (v - min) / range })
        .collect()
}

/// Standardizes the values with their mean and population standard deviation.
/// A zero deviation (including a single sample) maps every value to 0.
pub fn z_score_scale(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    values
        .iter()
        .map(|v| if std == 0.0 { 0.0 } else { (v - mean) / std })
        .collect()
}

// =============================================================================
// Building
// =============================================================================

/// Validates an adjustment and compiles it into a feature vector.
pub fn build(adj: &PreferenceAdjustment) -> Result<PreferenceVector, DiscoverError> {
    let bounded = read_group("bounded_cols", adj.bounded_cols.as_ref(), &BOUNDED_COLUMNS)?;
    let minmax = read_group("minmax_cols", adj.minmax_cols.as_ref(), &MINMAX_COLUMNS)?;
    let zscore = read_group("zscore_cols", adj.zscore_cols.as_ref(), &ZSCORE_COLUMNS)?;
    let mode = read_group("mode_cols", adj.mode_cols.as_ref(), &MODE_COLUMNS)?;

    for (column, value) in BOUNDED_COLUMNS.iter().zip(&bounded) {
        if !(0.0..=1.0).contains(value) {
            return Err(DiscoverError::Validation(format!(
                "Bounded value out of range [0,1] for bounded_cols.{}: {}",
                column, value
            )));
        }
    }
    for (column, value) in MODE_COLUMNS.iter().zip(&mode) {
        if *value != 0.0 && *value != 1.0 {
            return Err(DiscoverError::Validation(format!(
                "Mode must be 0 or 1 for mode_cols.{}, got: {}",
                column, value
            )));
        }
    }

    let minmax = min_max_scale(&minmax);
    if let Some(value) = minmax.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        return Err(DiscoverError::Validation(format!(
            "minmax_cols values span too wide a range to scale (got {})",
            value
        )));
    }
    let zscore = z_score_scale(&zscore);
    if zscore.iter().any(|v| !v.is_finite()) {
        return Err(DiscoverError::Validation(
            "zscore_cols values span too wide a range to scale".to_string(),
        ));
    }

    let mut assembled = bounded;
    assembled.extend(minmax);
    assembled.extend(zscore);
    assembled.extend(mode);

    let len = assembled.len();
    let values: [f64; VECTOR_LEN] = assembled.try_into().map_err(|_| {
        DiscoverError::Validation(format!(
            "Expected vector length {}, got {}",
            VECTOR_LEN, len
        ))
    })?;

    debug!(vector = ?values, "Built preference vector");
    Ok(PreferenceVector(values))
}

/// Parses and builds in one step.
pub fn build_from_json(json: &str) -> Result<PreferenceVector, DiscoverError> {
    build(&parse_adjustment(json)?)
}

fn read_group(
    group_name: &str,
    group: Option<&ColumnGroup>,
    columns: &[&str],
) -> Result<Vec<f64>, DiscoverError> {
    let group = group.ok_or_else(|| {
        DiscoverError::Validation(format!("Missing required group: {}", group_name))
    })?;

    columns
        .iter()
        .map(|column| match group.get(*column) {
            None | Some(serde_json::Value::Null) => Err(DiscoverError::Validation(format!(
                "Missing value for {}.{}",
                group_name, column
            ))),
            Some(value) => numeric_value(value).ok_or_else(|| {
                DiscoverError::Validation(format!(
                    "Invalid number in {}.{}: {}",
                    group_name, column, value
                ))
            }),
        })
        .collect()
}
