//! In-memory stores: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chefai_core::error::StoreError;
use chefai_core::history::{HistoryRecord, HistoryStore, SavedRecipe, SavedRecipeStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Question history kept in a Vec, oldest first.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<Vec<HistoryRecord>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, record: HistoryRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, StoreError> {
        let records = self.records.read().await;
        // Stable sort keeps insertion order among equal timestamps; reversing
        // afterwards puts the latest append first.
        let mut sorted: Vec<HistoryRecord> = records.clone();
        sorted.sort_by_key(|r| r.timestamp);
        sorted.reverse();
        sorted.truncate(limit);
        Ok(sorted)
    }
}

/// Saved recipes kept in a Vec, insertion order.
#[derive(Clone, Default)]
pub struct InMemorySavedRecipeStore {
    recipes: Arc<RwLock<Vec<SavedRecipe>>>,
}

impl InMemorySavedRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavedRecipeStore for InMemorySavedRecipeStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn save(&self, recipe: SavedRecipe) -> Result<(), StoreError> {
        let mut recipes = self.recipes.write().await;
        if recipes.iter().any(|r| r.recipe_id == recipe.recipe_id) {
            return Err(StoreError::Storage(format!(
                "Recipe {} already exists",
                recipe.recipe_id
            )));
        }
        recipes.push(recipe);
        Ok(())
    }

    async fn get(&self, recipe_id: &str) -> Result<Option<SavedRecipe>, StoreError> {
        let recipes = self.recipes.read().await;
        Ok(recipes.iter().find(|r| r.recipe_id == recipe_id).cloned())
    }

    async fn list(&self) -> Result<Vec<SavedRecipe>, StoreError> {
        let mut recipes = self.recipes.read().await.clone();
        recipes.sort_by_key(|r| r.timestamp);
        recipes.reverse();
        Ok(recipes)
    }
}
