pub mod error;
pub mod service;
pub mod voice;

pub use error::AudioServiceError;
pub use service::{AudioClip, AudioService, AudioServiceApi};
pub use voice::Voice;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Request for POST /functions/v1/generate-audio
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AudioRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
}

/// Base64 audio payload returned to the client
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioResponse {
    pub audio: String,
    pub format: String,
}

impl From<AudioClip> for AudioResponse {
    fn from(clip: AudioClip) -> Self {
        Self {
            audio: STANDARD.encode(&clip.audio_data),
            format: "mp3".to_string(),
        }
    }
}
