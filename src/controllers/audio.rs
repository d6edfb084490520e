use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::domain::audio::{AudioRequest, AudioResponse, AudioService, AudioServiceApi};
use crate::error::{AppError, AppResult};

pub struct AudioController {
    audio_service: Arc<AudioService>,
}

impl AudioController {
    pub fn new(audio_service: Arc<AudioService>) -> Self {
        Self { audio_service }
    }

    /// POST /functions/v1/generate-audio - Narrate text as base64 MP3
    pub async fn generate(
        State(controller): State<Arc<AudioController>>,
        payload: Result<Json<AudioRequest>, JsonRejection>,
    ) -> AppResult<Json<AudioResponse>> {
        let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

        let clip = controller
            .audio_service
            .synthesize(request.text, request.voice)
            .await?;

        Ok(Json(clip.into()))
    }
}
