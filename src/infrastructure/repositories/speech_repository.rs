use super::upstream_client::{UpstreamClient, UpstreamError};
use crate::domain::audio::Voice;
use async_openai::types::{self as openai, CreateSpeechRequest, SpeechModel, SpeechResponseFormat};
use async_trait::async_trait;
use std::sync::Arc;

impl From<Voice> for openai::Voice {
    fn from(voice: Voice) -> Self {
        match voice {
            Voice::Alloy => openai::Voice::Alloy,
            Voice::Echo => openai::Voice::Echo,
            Voice::Fable => openai::Voice::Fable,
            Voice::Onyx => openai::Voice::Onyx,
            Voice::Nova => openai::Voice::Nova,
            Voice::Shimmer => openai::Voice::Shimmer,
        }
    }
}

/// Repository for speech synthesis.
/// Abstracts the underlying TTS provider.
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    /// Synthesize text with the given voice
    ///
    /// Returns MP3 audio ready for playback
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>, UpstreamError>;
}

/// OpenAI TTS implementation of the speech repository
pub struct OpenAiSpeechRepository {
    client: Arc<UpstreamClient>,
    model: String,
}

impl OpenAiSpeechRepository {
    pub fn new(client: Arc<UpstreamClient>, model: String) -> Self {
        Self { client, model }
    }

    fn build_request(&self, text: &str, voice: Voice) -> CreateSpeechRequest {
        let model = match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        };

        CreateSpeechRequest {
            model,
            input: text.to_string(),
            voice: voice.into(),
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: None,
        }
    }
}

#[async_trait]
impl SpeechRepository for OpenAiSpeechRepository {
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>, UpstreamError> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %self.model,
            voice = %voice,
            text_length = text.len(),
            "Calling OpenAI TTS API"
        );

        let request = self.build_request(text, voice);
        let audio_data = self.client.post_json("audio/speech", &request).await?;

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "openai",
            model = %self.model,
            voice = %voice,
            latency_ms = duration.as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}
