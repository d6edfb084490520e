use axum::Router;
use std::sync::Arc;

use crate::controllers::{audio::AudioController, story::StoryController};
use crate::domain::audio::AudioService;
use crate::domain::shared::random::{RandomSource, ThreadRandom};
use crate::domain::story::{GenerationSettings, StoryService};
use crate::infrastructure::config::Config;
use crate::infrastructure::credentials::RandomCredentialPool;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::http::create_router;
use crate::infrastructure::repositories::{
    OpenAiCompletionRepository, OpenAiSpeechRepository, PgStoryRepository, UpstreamClient,
};

/// Wire repositories, services and controllers into the application router
pub fn build_app(config: &Config, pool: Arc<DbPool>) -> Result<Router, Box<dyn std::error::Error>> {
    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);

    let credentials = Arc::new(RandomCredentialPool::new(
        config.openai_api_keys.clone(),
        random.clone(),
    ));
    if credentials.is_empty() {
        tracing::warn!("No OpenAI API keys configured, generation requests will fail");
    } else {
        tracing::info!(key_count = credentials.len(), "OpenAI credential pool ready");
    }

    // 1. Repositories
    let upstream = Arc::new(UpstreamClient::new(
        config.openai_base_url.clone(),
        credentials,
        config.upstream.clone(),
    )?);
    let story_repo = Arc::new(PgStoryRepository::new(pool.clone()));
    let completion_repo = Arc::new(OpenAiCompletionRepository::new(
        upstream.clone(),
        config.chat_model.clone(),
    ));
    let speech_repo = Arc::new(OpenAiSpeechRepository::new(
        upstream,
        config.tts_model.clone(),
    ));

    // 2. Services
    let story_service = Arc::new(StoryService::new(
        story_repo,
        completion_repo,
        random,
        GenerationSettings::new(config.story_length),
    ));
    let audio_service = Arc::new(AudioService::new(speech_repo, config.default_voice));

    // 3. Controllers
    let story_controller = Arc::new(StoryController::new(story_service));
    let audio_controller = Arc::new(AudioController::new(audio_service));

    Ok(create_router(pool, story_controller, audio_controller))
}
