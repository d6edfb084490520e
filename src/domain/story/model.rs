use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub content_hash: String,
    pub theme: String,
    pub created_at: DateTime<Utc>,
}

/// Fields the pipeline hands to the repository; id and timestamp are
/// assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStory {
    pub title: String,
    pub content: String,
    pub content_hash: String,
    pub theme: String,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedStory {
    Persisted(Story),
    /// Lost a duplicate-key race; shown to the caller but never stored
    Ephemeral { placeholder_id: String, story: NewStory },
}

impl GeneratedStory {
    pub fn is_persisted(&self) -> bool {
        matches!(self, GeneratedStory::Persisted(_))
    }
}
