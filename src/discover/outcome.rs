use crate::catalog::SearchSeedsResult;
use crate::error::{DiscoverError, ErrorKind};
use crate::features::PreferenceVector;
use crate::similarity::ScoredTrack;
use serde::Serialize;

/// Stages of one discover run, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Extract,
    Search,
    Expand,
    BuildVector,
    Query,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Extract => "extract",
            PipelineStage::Search => "search",
            PipelineStage::Expand => "expand",
            PipelineStage::BuildVector => "build_vector",
            PipelineStage::Query => "query",
            PipelineStage::Done => "done",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result envelope of a discover run.
///
/// A successful run carries every intermediate product; a failed run carries
/// only the stage it failed in and the error.
#[derive(Clone, Debug, Serialize)]
pub struct DiscoverOutcome {
    pub success: bool,
    pub stage: PipelineStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeds: Option<SearchSeedsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_track_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<PreferenceVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<ScoredTrack>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl DiscoverOutcome {
    pub fn failed(stage: PipelineStage, err: &DiscoverError) -> Self {
        Self {
            success: false,
            stage,
            user_prompt: None,
            seeds: None,
            candidate_track_ids: None,
            vector: None,
            matches: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }
}
