use axum::extract::FromRef;

use crate::discover::PipelineOrchestrator;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedOrchestrator = Arc<PipelineOrchestrator>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub orchestrator: GuardedOrchestrator,
}

impl ServerState {
    pub fn new(config: ServerConfig, orchestrator: GuardedOrchestrator) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_owned(),
            orchestrator,
        }
    }
}

impl FromRef<ServerState> for GuardedOrchestrator {
    fn from_ref(input: &ServerState) -> Self {
        input.orchestrator.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
