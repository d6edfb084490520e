pub mod error;
pub mod hash;
pub mod model;
pub mod prompt;
pub mod service;
pub mod theme;

pub use error::StoryServiceError;
pub use hash::content_hash;
pub use model::{GeneratedStory, NewStory, Story};
pub use prompt::LengthBand;
pub use service::{GenerationSettings, PipelineStage, StoryService, StoryServiceApi};
pub use theme::THEMES;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORIES_PER_PAGE: u32 = 5;
pub const MAX_STORIES_PER_PAGE: u32 = 50;

/// Story as returned to clients; ephemeral stories carry a placeholder id
/// and no timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Story> for StoryResponse {
    fn from(story: Story) -> Self {
        Self {
            id: story.id.to_string(),
            title: story.title,
            content: story.content,
            theme: story.theme,
            created_at: Some(story.created_at),
        }
    }
}

impl From<GeneratedStory> for StoryResponse {
    fn from(generated: GeneratedStory) -> Self {
        match generated {
            GeneratedStory::Persisted(story) => story.into(),
            GeneratedStory::Ephemeral {
                placeholder_id,
                story,
            } => Self {
                id: placeholder_id,
                title: story.title,
                content: story.content,
                theme: story.theme,
                created_at: None,
            },
        }
    }
}

/// Query for GET /api/stories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryListQuery {
    /// Exact theme to filter on; absent, empty or "all" lists every theme
    pub theme: Option<String>,
    /// 1-based page number
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl StoryListQuery {
    pub fn theme_filter(&self) -> Option<&str> {
        self.theme
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "all")
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_STORIES_PER_PAGE)
            .clamp(1, MAX_STORIES_PER_PAGE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.per_page())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryListResponse {
    pub stories: Vec<StoryResponse>,
    pub total_count: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemesResponse {
    pub themes: Vec<String>,
}
