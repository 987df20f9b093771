//! The discover pipeline: extraction, seed search, expansion, vector building
//! and similarity query, reported as a single outcome.

mod orchestrator;
mod outcome;

pub use orchestrator::{PipelineOrchestrator, PipelineSettings};
pub use outcome::{DiscoverOutcome, PipelineStage};
