use crate::error::AppError;
use crate::infrastructure::credentials::CredentialError;
use crate::infrastructure::repositories::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum AudioServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    UpstreamSynthesis(String),
    #[error("No OpenAI API keys configured")]
    NoCredentialsConfigured,
}

impl From<UpstreamError> for AudioServiceError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Credentials(CredentialError::NoCredentialsConfigured) => {
                AudioServiceError::NoCredentialsConfigured
            }
            UpstreamError::Status { status, .. } => {
                AudioServiceError::UpstreamSynthesis(format!("OpenAI TTS API error: {}", status))
            }
            other => AudioServiceError::UpstreamSynthesis(other.to_string()),
        }
    }
}

impl From<AudioServiceError> for AppError {
    fn from(err: AudioServiceError) -> Self {
        match err {
            AudioServiceError::Invalid(msg) => AppError::InvalidInput(msg),
            other => AppError::AudioGeneration(other.to_string()),
        }
    }
}
