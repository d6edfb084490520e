use crate::error::AppError;
use crate::infrastructure::credentials::CredentialError;
use crate::infrastructure::repositories::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum StoryServiceError {
    #[error("{0}")]
    UpstreamGeneration(String),
    #[error("{0}")]
    Persistence(String),
    #[error("No OpenAI API keys configured")]
    NoCredentialsConfigured,
}

impl From<UpstreamError> for StoryServiceError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Credentials(CredentialError::NoCredentialsConfigured) => {
                StoryServiceError::NoCredentialsConfigured
            }
            UpstreamError::Status { status, .. } => {
                StoryServiceError::UpstreamGeneration(format!("OpenAI API error: {}", status))
            }
            other => StoryServiceError::UpstreamGeneration(other.to_string()),
        }
    }
}

impl From<StoryServiceError> for AppError {
    fn from(err: StoryServiceError) -> Self {
        AppError::StoryGeneration(err.to_string())
    }
}
