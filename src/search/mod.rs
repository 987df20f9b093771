//! Seed search: query cleaning and catalog resolution of extracted entities.

pub mod normalizer;
mod seeds;

pub use normalizer::{clean, clean_non_empty};
pub use seeds::{dedupe_by_id, filter_exact_artists, CatalogSearchEngine, SEARCH_PAGE_SIZE};
