use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::BotResult,
    service::{CerebrasClient, Orchestrator, SessionService, UsageLedger, YoutubeTranscriptFetcher},
    storage,
    utils::http,
};

/// Shared by every handler through the dispatcher's dependency map.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> BotResult<Self> {
        let store = storage::open_store(&config.database.url, config.database.token.as_deref()).await?;

        let transcripts = YoutubeTranscriptFetcher::new(http::create_transcript_client()?);
        let generator = CerebrasClient::new(
            http::create_generation_client()?,
            config.generation.api_key.clone(),
            config.generation.base_url.clone(),
        );

        let orchestrator = Orchestrator::new(
            UsageLedger::new(store),
            SessionService::new(),
            Arc::new(transcripts),
            Arc::new(generator),
            config.pipeline_settings(),
        );

        info!("AppState initialized");

        Ok(Self::from_orchestrator(orchestrator))
    }

    pub fn from_orchestrator(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
