//! Web search service: live results for questions the corpus can't answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SearchError;

/// One web result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchHit {
    pub title: String,
    pub url: String,
    pub excerpt: String,
}

#[async_trait]
pub trait WebSearchService: Send + Sync {
    fn name(&self) -> &str;

    /// Search the web, returning at most `max_results` hits in provider order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebSearchHit>, SearchError>;
}
