use crate::domain::story::{NewStory, Story};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoryRepositoryError {
    #[error("a story with this content hash already exists")]
    DuplicateKey,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One page of stories plus the number of rows matching the filter
#[derive(Debug, Clone, PartialEq)]
pub struct StoryPage {
    pub stories: Vec<Story>,
    pub total_count: u64,
}

/// The persisted story collection.
///
/// `insert` is the authoritative duplicate guard: implementations must
/// reject a second story with the same `content_hash` with
/// [`StoryRepositoryError::DuplicateKey`].
#[async_trait]
pub trait StoryRepository: Send + Sync {
    async fn count(&self) -> Result<u64, StoryRepositoryError>;

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<Story>, StoryRepositoryError>;

    async fn insert(&self, story: &NewStory) -> Result<Story, StoryRepositoryError>;

    /// Newest first, optionally restricted to one theme
    async fn list(
        &self,
        theme: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<StoryPage, StoryRepositoryError>;
}

pub struct PgStoryRepository {
    pool: Arc<DbPool>,
}

impl PgStoryRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn count(&self) -> Result<u64, StoryRepositoryError> {
        let pool = self.pool.as_ref();
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stories")
            .fetch_one(pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<Story>, StoryRepositoryError> {
        let pool = self.pool.as_ref();
        let story = sqlx::query_as::<_, Story>(
            r#"
            SELECT id, title, content, content_hash, theme, created_at
            FROM stories
            WHERE content_hash = $1
            "#,
        )
        .bind(content_hash)
        .fetch_optional(pool)
        .await?;

        Ok(story)
    }

    async fn insert(&self, story: &NewStory) -> Result<Story, StoryRepositoryError> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        sqlx::query_as::<_, Story>(
            r#"
            INSERT INTO stories (id, title, content, content_hash, theme, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, content, content_hash, theme, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.content_hash)
        .bind(&story.theme)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return StoryRepositoryError::DuplicateKey;
                }
            }
            StoryRepositoryError::Database(e)
        })
    }

    async fn list(
        &self,
        theme: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<StoryPage, StoryRepositoryError> {
        let pool = self.pool.as_ref();

        let total_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stories
            WHERE ($1::TEXT IS NULL OR theme = $1)
            "#,
        )
        .bind(theme)
        .fetch_one(pool)
        .await?;

        let stories = sqlx::query_as::<_, Story>(
            r#"
            SELECT id, title, content, content_hash, theme, created_at
            FROM stories
            WHERE ($1::TEXT IS NULL OR theme = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(theme)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;

        Ok(StoryPage {
            stories,
            total_count: total_count.max(0) as u64,
        })
    }
}
