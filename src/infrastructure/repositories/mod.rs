pub mod completion_repository;
pub mod speech_repository;
pub mod story_repository;
pub mod upstream_client;

pub use completion_repository::{CompletionRepository, CompletionRequest, OpenAiCompletionRepository};
pub use speech_repository::{OpenAiSpeechRepository, SpeechRepository};
pub use story_repository::{PgStoryRepository, StoryPage, StoryRepository, StoryRepositoryError};
pub use upstream_client::{UpstreamClient, UpstreamError};
