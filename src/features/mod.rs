//! Feature vector building: validation and scaling of preference adjustments.

mod adjustment;
mod vector;

pub use adjustment::{
    numeric_value, parse_adjustment, ColumnGroup, PreferenceAdjustment, SeedMetadata,
    BOUNDED_COLUMNS, MINMAX_COLUMNS, MODE_COLUMNS, ZSCORE_COLUMNS,
};
pub use vector::{
    build, build_from_json, min_max_scale, z_score_scale, PreferenceVector, VECTOR_COLUMNS,
    VECTOR_LEN,
};
