use super::error::AudioServiceError;
use super::voice::Voice;
use crate::infrastructure::repositories::SpeechRepository;
use async_trait::async_trait;
use std::sync::Arc;

/// Synthesized narration
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub audio_data: Vec<u8>,
    pub voice: Voice,
}

pub struct AudioService {
    speech_repo: Arc<dyn SpeechRepository>,
    default_voice: Voice,
}

impl AudioService {
    pub fn new(speech_repo: Arc<dyn SpeechRepository>, default_voice: Voice) -> Self {
        Self {
            speech_repo,
            default_voice,
        }
    }
}

#[async_trait]
pub trait AudioServiceApi: Send + Sync {
    /// Synthesize `text` with the requested voice
    ///
    /// This operation:
    /// - Rejects blank text
    /// - Falls back to the default voice when the requested one is unknown
    /// - Calls the speech service once; nothing is cached
    async fn synthesize(
        &self,
        text: Option<String>,
        voice: Option<String>,
    ) -> Result<AudioClip, AudioServiceError>;
}

#[async_trait]
impl AudioServiceApi for AudioService {
    async fn synthesize(
        &self,
        text: Option<String>,
        voice: Option<String>,
    ) -> Result<AudioClip, AudioServiceError> {
        let text = text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AudioServiceError::Invalid("Text is required".to_string()))?;

        let selected_voice = Voice::resolve(voice.as_deref(), self.default_voice);
        if let Some(requested) = voice.as_deref() {
            if requested != selected_voice.as_str() {
                tracing::warn!(
                    requested_voice = requested,
                    voice = %selected_voice,
                    "Unsupported voice requested, using default"
                );
            }
        }

        tracing::info!(
            voice = %selected_voice,
            text_length = text.len(),
            "Generating audio"
        );

        let audio_data = self.speech_repo.synthesize(&text, selected_voice).await?;

        tracing::info!(
            voice = %selected_voice,
            audio_size = audio_data.len(),
            "Audio generated successfully"
        );

        Ok(AudioClip {
            audio_data,
            voice: selected_voice,
        })
    }
}
