use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::domain::story::{
    StoryListQuery, StoryListResponse, StoryResponse, StoryService, StoryServiceApi,
    ThemesResponse,
};
use crate::error::{AppError, AppResult};

pub struct StoryController {
    story_service: Arc<StoryService>,
}

impl StoryController {
    pub fn new(story_service: Arc<StoryService>) -> Self {
        Self { story_service }
    }

    /// POST /functions/v1/generate-story - Generate and store a new story
    ///
    /// The request body is ignored.
    pub async fn generate(
        State(controller): State<Arc<StoryController>>,
    ) -> AppResult<Json<StoryResponse>> {
        let generated = controller.story_service.generate_story().await?;
        Ok(Json(generated.into()))
    }

    /// GET /api/stories - List stored stories, newest first
    pub async fn list_stories(
        State(controller): State<Arc<StoryController>>,
        Query(query): Query<StoryListQuery>,
    ) -> AppResult<Json<StoryListResponse>> {
        let page = controller
            .story_service
            .list_stories(query)
            .await
            .map_err(|e| AppError::StoryListing(e.to_string()))?;
        Ok(Json(page))
    }

    /// GET /api/themes - Theme catalogue
    pub async fn themes(State(controller): State<Arc<StoryController>>) -> Json<ThemesResponse> {
        Json(ThemesResponse {
            themes: controller.story_service.themes(),
        })
    }
}
