use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to generate story: {0}")]
    StoryGeneration(String),

    #[error("Failed to generate audio: {0}")]
    AudioGeneration(String),

    #[error("Failed to list stories: {0}")]
    StoryListing(String),

    #[error("{0}")]
    InvalidInput(String),
}

/// Uniform error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// Get the HTTP status code for this error.
    ///
    /// Every failure surfaces as a 500 so that clients only ever deal with a
    /// single error shape.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::StoryGeneration(_)
            | Self::AudioGeneration(_)
            | Self::StoryListing(_)
            | Self::InvalidInput(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(
            error = %self,
            status = %status.as_u16(),
            "Request failed"
        );

        (status, Json(self.to_response())).into_response()
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
