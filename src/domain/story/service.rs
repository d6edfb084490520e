use super::error::StoryServiceError;
use super::hash::content_hash;
use super::model::{GeneratedStory, NewStory};
use super::prompt::{
    clean_title, story_system_prompt, story_user_prompt, uniqueness_seed, LengthBand,
    TITLE_SYSTEM_PROMPT,
};
use super::theme::{default_themes, theme_index};
use super::{StoryListQuery, StoryListResponse, StoryResponse};
use crate::domain::shared::random::RandomSource;
use crate::infrastructure::repositories::{
    CompletionRepository, CompletionRequest, StoryRepository, StoryRepositoryError,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Knobs for the two upstream generation calls
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub themes: Vec<String>,
    pub length_band: LengthBand,
    pub story_max_tokens: u32,
    pub story_temperature: f32,
    pub title_max_tokens: u32,
    pub title_temperature: f32,
}

impl GenerationSettings {
    pub fn new(length_band: LengthBand) -> Self {
        Self {
            themes: default_themes(),
            length_band,
            story_max_tokens: 800,
            story_temperature: 0.9,
            title_max_tokens: 20,
            title_temperature: 0.8,
        }
    }

    /// Replace the theme catalogue; an empty list keeps the current one
    pub fn with_themes(mut self, themes: Vec<String>) -> Self {
        if !themes.is_empty() {
            self.themes = themes;
        }
        self
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::new(LengthBand::Long)
    }
}

/// Stages of one generation run, logged as the run progresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    GeneratingContent,
    GeneratingTitle,
    Hashing,
    CheckingDuplicate,
    Persisting,
    Done,
    DoneEphemeral,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::GeneratingContent => "generating_content",
            PipelineStage::GeneratingTitle => "generating_title",
            PipelineStage::Hashing => "hashing",
            PipelineStage::CheckingDuplicate => "checking_duplicate",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Done => "done",
            PipelineStage::DoneEphemeral => "done_ephemeral",
            PipelineStage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct StoryService {
    story_repo: Arc<dyn StoryRepository>,
    completion_repo: Arc<dyn CompletionRepository>,
    random: Arc<dyn RandomSource>,
    settings: GenerationSettings,
}

impl StoryService {
    pub fn new(
        story_repo: Arc<dyn StoryRepository>,
        completion_repo: Arc<dyn CompletionRepository>,
        random: Arc<dyn RandomSource>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            story_repo,
            completion_repo,
            random,
            settings,
        }
    }
}

#[async_trait]
pub trait StoryServiceApi: Send + Sync {
    /// Generate, fingerprint and persist one new story
    ///
    /// This operation:
    /// - Picks a theme from the corpus size plus a random offset
    /// - Calls the language model for the story, then for its title
    /// - Inserts the story; losing a duplicate-hash race yields an
    ///   unsaved story instead of an error
    ///
    /// Nothing is retried here; upstream retry policy lives in the client.
    async fn generate_story(&self) -> Result<GeneratedStory, StoryServiceError>;

    /// Page through stored stories, newest first
    async fn list_stories(
        &self,
        query: StoryListQuery,
    ) -> Result<StoryListResponse, StoryServiceError>;

    fn themes(&self) -> Vec<String>;
}

#[async_trait]
impl StoryServiceApi for StoryService {
    async fn generate_story(&self) -> Result<GeneratedStory, StoryServiceError> {
        let span = tracing::info_span!("generate_story", invocation_id = %Uuid::new_v4());

        async {
            let mut stage = PipelineStage::Idle;
            let result = self.run_pipeline(&mut stage).await;

            match &result {
                Ok(generated) if generated.is_persisted() => {
                    transition(&mut stage, PipelineStage::Done)
                }
                Ok(_) => transition(&mut stage, PipelineStage::DoneEphemeral),
                Err(e) => {
                    tracing::debug!(stage = %stage, error = %e, "Story generation failed");
                    transition(&mut stage, PipelineStage::Failed);
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn list_stories(
        &self,
        query: StoryListQuery,
    ) -> Result<StoryListResponse, StoryServiceError> {
        let page = query.page();
        let per_page = query.per_page();

        tracing::debug!(
            theme = ?query.theme_filter(),
            page = page,
            per_page = per_page,
            "Listing stories"
        );

        let result = self
            .story_repo
            .list(query.theme_filter(), query.offset(), u64::from(per_page))
            .await
            .map_err(|e| StoryServiceError::Persistence(e.to_string()))?;

        Ok(StoryListResponse {
            stories: result.stories.into_iter().map(StoryResponse::from).collect(),
            total_count: result.total_count,
            page,
            per_page,
            total_pages: result.total_count.div_ceil(u64::from(per_page)),
        })
    }

    fn themes(&self) -> Vec<String> {
        self.settings.themes.clone()
    }
}

impl StoryService {
    async fn run_pipeline(
        &self,
        stage: &mut PipelineStage,
    ) -> Result<GeneratedStory, StoryServiceError> {
        let story_count = self
            .story_repo
            .count()
            .await
            .map_err(|e| StoryServiceError::Persistence(e.to_string()))?;
        let theme = self.select_theme(story_count);

        tracing::info!(story_count = story_count, theme = %theme, "Theme selected");

        transition(stage, PipelineStage::GeneratingContent);
        let content = self.generate_content(&theme, story_count + 1).await?;

        transition(stage, PipelineStage::GeneratingTitle);
        let title = self.generate_title(&content).await?;

        transition(stage, PipelineStage::Hashing);
        let hash = content_hash(&content);

        transition(stage, PipelineStage::CheckingDuplicate);
        self.report_existing_duplicate(&hash).await;

        transition(stage, PipelineStage::Persisting);
        let new_story = NewStory {
            title,
            content,
            content_hash: hash,
            theme,
        };

        match self.story_repo.insert(&new_story).await {
            Ok(story) => {
                tracing::info!(
                    story_id = %story.id,
                    title = %story.title,
                    "Story generated successfully"
                );
                Ok(GeneratedStory::Persisted(story))
            }
            Err(StoryRepositoryError::DuplicateKey) => {
                let placeholder_id = format!("temp-{}", Utc::now().timestamp_millis());
                tracing::warn!(
                    content_hash = %new_story.content_hash,
                    placeholder_id = %placeholder_id,
                    "Duplicate content hash on insert, returning unsaved story"
                );
                Ok(GeneratedStory::Ephemeral {
                    placeholder_id,
                    story: new_story,
                })
            }
            Err(e) => Err(StoryServiceError::Persistence(e.to_string())),
        }
    }

    /// Theme for the next story: `(story_count + draw) mod theme_count`
    pub fn select_theme(&self, story_count: u64) -> String {
        let themes = &self.settings.themes;
        let draw = self.random.below(themes.len());
        themes[theme_index(story_count, draw, themes.len())].clone()
    }

    async fn generate_content(
        &self,
        theme: &str,
        story_number: u64,
    ) -> Result<String, StoryServiceError> {
        let seed = uniqueness_seed(Utc::now(), self.random.next_u64());

        let content = self
            .completion_repo
            .complete(CompletionRequest {
                system: story_system_prompt(theme, self.settings.length_band, &seed),
                user: story_user_prompt(theme, story_number),
                max_tokens: self.settings.story_max_tokens,
                temperature: self.settings.story_temperature,
            })
            .await?;

        tracing::debug!(content_length = content.chars().count(), "Story content generated");

        Ok(content)
    }

    async fn generate_title(&self, content: &str) -> Result<String, StoryServiceError> {
        let raw_title = self
            .completion_repo
            .complete(CompletionRequest {
                system: TITLE_SYSTEM_PROMPT.to_string(),
                user: content.to_string(),
                max_tokens: self.settings.title_max_tokens,
                temperature: self.settings.title_temperature,
            })
            .await?;

        let title = clean_title(&raw_title);
        if title.is_empty() {
            return Err(StoryServiceError::UpstreamGeneration(
                "OpenAI API returned an empty title".to_string(),
            ));
        }

        Ok(title)
    }

    /// Advisory only: the insert constraint is what keeps duplicates out
    async fn report_existing_duplicate(&self, hash: &str) {
        match self.story_repo.find_by_hash(hash).await {
            Ok(Some(existing)) => tracing::warn!(
                content_hash = %hash,
                existing_story_id = %existing.id,
                "Duplicate detected, story generation succeeded but matched existing"
            ),
            Ok(None) => {}
            Err(e) => tracing::warn!(
                content_hash = %hash,
                error = %e,
                "Duplicate lookup failed, relying on insert constraint"
            ),
        }
    }
}

fn transition(stage: &mut PipelineStage, next: PipelineStage) {
    tracing::debug!(from = %stage, to = %next, "Pipeline stage");
    *stage = next;
}
