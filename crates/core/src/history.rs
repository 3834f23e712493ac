//! History and saved-recipe stores.
//!
//! Both are append-mostly. Each operation touches a single record, so the
//! core relies on the backing store's own concurrency control.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::StoreError;
use crate::tool::ToolInvocation;

/// A question the user asked, as persisted by the request handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub question: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Persisted log of user questions.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    fn name(&self) -> &str;

    /// Append one question.
    async fn append(&self, record: HistoryRecord) -> Result<(), StoreError>;

    /// The `limit` most recent questions, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, StoreError>;
}

/// An agent answer the user chose to keep.
///
/// Immutable once stored. `recipe_id` is derived from the submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub recipe_id: String,
    pub query: String,
    pub answer: String,
    /// Tool invocations that led to the answer, in execution order
    #[serde(default)]
    pub trace: Vec<ToolInvocation>,
    pub timestamp: DateTime<Utc>,
}

impl SavedRecipe {
    /// Build a record stamped with the current time.
    pub fn new(query: impl Into<String>, answer: impl Into<String>, trace: Vec<ToolInvocation>) -> Self {
        let timestamp = Utc::now();
        Self {
            recipe_id: recipe_id_for(timestamp),
            query: query.into(),
            answer: answer.into(),
            trace,
            timestamp,
        }
    }
}

/// `recipe_` followed by the UTC submission time down to microseconds.
pub fn recipe_id_for(timestamp: DateTime<Utc>) -> String {
    format!("recipe_{}", timestamp.format("%Y%m%d%H%M%S%6f"))
}

#[async_trait]
pub trait SavedRecipeStore: Send + Sync {
    fn name(&self) -> &str;

    /// Store a new recipe. Fails if the id is already taken.
    async fn save(&self, recipe: SavedRecipe) -> Result<(), StoreError>;

    async fn get(&self, recipe_id: &str) -> Result<Option<SavedRecipe>, StoreError>;

    /// All saved recipes, newest first.
    async fn list(&self) -> Result<Vec<SavedRecipe>, StoreError>;
}
