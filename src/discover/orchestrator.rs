//! Sequencing of the discover pipeline.

use super::outcome::{DiscoverOutcome, PipelineStage};
use crate::agent::{seed_attributes, EntityExtractor, PreferenceInterpreter};
use crate::catalog::{AccessToken, CatalogClient};
use crate::error::DiscoverError;
use crate::expansion::SeedExpander;
use crate::features;
use crate::search::CatalogSearchEngine;
use crate::server::metrics;
use crate::similarity::SimilarityIndex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Tunables shared by the search and expansion stages.
#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub market: String,
    pub max_concurrent_lookups: usize,
    pub default_result_limit: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            market: crate::expansion::DEFAULT_MARKET.to_string(),
            max_concurrent_lookups: 8,
            default_result_limit: 10,
        }
    }
}

pub struct PipelineOrchestrator {
    extractor: Arc<dyn EntityExtractor>,
    interpreter: Arc<dyn PreferenceInterpreter>,
    search_engine: CatalogSearchEngine,
    expander: SeedExpander,
    similarity: Option<Arc<dyn SimilarityIndex>>,
    default_result_limit: usize,
}

impl PipelineOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        extractor: Arc<dyn EntityExtractor>,
        interpreter: Arc<dyn PreferenceInterpreter>,
        similarity: Option<Arc<dyn SimilarityIndex>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            interpreter,
            search_engine: CatalogSearchEngine::new(
                catalog.clone(),
                settings.max_concurrent_lookups,
            ),
            expander: SeedExpander::new(
                catalog,
                settings.market,
                settings.max_concurrent_lookups,
            ),
            similarity,
            default_result_limit: settings.default_result_limit,
        }
    }

    /// Runs the whole pipeline once for a user's free-text request.
    ///
    /// Never fails: errors are reported in the returned envelope together with
    /// the stage that produced them.
    pub async fn discover(
        &self,
        user_input: &str,
        token: Option<&AccessToken>,
        limit: Option<usize>,
    ) -> DiscoverOutcome {
        let started = Instant::now();
        let outcome = match self.run(user_input, token, limit).await {
            Ok(outcome) => outcome,
            Err((stage, err)) => {
                error!(stage = %stage, error = %err, "Discover pipeline failed");
                DiscoverOutcome::failed(stage, &err)
            }
        };

        let result = if outcome.success { "success" } else { "failure" };
        metrics::record_pipeline_run(result, outcome.stage.as_str(), started.elapsed());
        outcome
    }

    async fn run(
        &self,
        user_input: &str,
        token: Option<&AccessToken>,
        limit: Option<usize>,
    ) -> Result<DiscoverOutcome, (PipelineStage, DiscoverError)> {
        // No point asking the extractor if the catalog can't be searched.
        let token = token.ok_or_else(|| {
            (
                PipelineStage::Search,
                DiscoverError::Auth("No access token available".to_string()),
            )
        })?;

        let entities = self
            .extractor
            .extract(user_input)
            .await
            .map_err(|e| (PipelineStage::Extract, e))?;
        info!(
            song_titles = entities.song_titles.len(),
            artists = entities.artists.len(),
            albums = entities.albums.len(),
            playlists = entities.playlists.len(),
            "Entities extracted"
        );

        let seeds = self
            .search_engine
            .search(&entities, Some(token))
            .await
            .map_err(|e| (PipelineStage::Search, e))?;

        let candidates = self
            .expander
            .expand(&seeds, Some(token))
            .await
            .map_err(|e| (PipelineStage::Expand, e))?;

        let (seed_result, user_prompt) = seeds;
        let attributes = seed_attributes(&seed_result);
        let adjustment = self
            .interpreter
            .interpret(&user_prompt, attributes.as_ref())
            .await
            .map_err(|e| (PipelineStage::BuildVector, e))?;
        let vector =
            features::build(&adjustment).map_err(|e| (PipelineStage::BuildVector, e))?;

        let matches = match &self.similarity {
            Some(index) => {
                let limit = limit.unwrap_or(self.default_result_limit);
                let matches = index
                    .query(&vector, limit)
                    .await
                    .map_err(|e| (PipelineStage::Query, DiscoverError::from(e)))?;
                Some(matches)
            }
            None => None,
        };

        info!(
            seeds = seed_result.total(),
            candidates = candidates.len(),
            matches = matches.as_ref().map(Vec::len),
            "Discover pipeline complete"
        );

        Ok(DiscoverOutcome {
            success: true,
            stage: PipelineStage::Done,
            user_prompt: Some(user_prompt),
            seeds: Some(seed_result),
            candidate_track_ids: Some(candidates),
            vector: Some(vector),
            matches,
            error: None,
            error_kind: None,
        })
    }
}
