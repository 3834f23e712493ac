//! Recipe search tool: semantic search over the recipe corpus.
//!
//! Returns the retriever's top-K passages as-is. No re-ranking here; K is
//! fixed at construction.

use async_trait::async_trait;
use chefai_core::error::ToolError;
use chefai_core::retrieval::RetrievalService;
use chefai_core::session::Session;
use chefai_core::tool::{Tool, ToolInput, ToolKind, ToolOutput};
use std::sync::Arc;
use tracing::debug;

pub struct RecipeSearchTool {
    retriever: Arc<dyn RetrievalService>,
    top_k: usize,
}

impl RecipeSearchTool {
    pub fn new(retriever: Arc<dyn RetrievalService>, top_k: usize) -> Self {
        Self { retriever, top_k }
    }
}

#[async_trait]
impl Tool for RecipeSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::RecipeSearch
    }

    async fn execute(&self, input: ToolInput, _session: &mut Session) -> Result<ToolOutput, ToolError> {
        let requested = input.kind();
        let ToolInput::RecipeSearch { query } = input else {
            return Err(ToolError::InvalidArguments(format!(
                "recipe_search cannot handle {:?} input",
                requested
            )));
        };

        let documents = self
            .retriever
            .search(&query, self.top_k)
            .await
            .map_err(|e| crate::execution_failed(self.kind(), e))?;

        debug!(
            backend = self.retriever.name(),
            query = %query,
            hits = documents.len(),
            "Recipe search complete"
        );
        Ok(ToolOutput::Recipes(documents))
    }
}
