//! Retrieval service: semantic search over the recipe corpus.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SearchError;

/// A passage returned by the retrieval service, ranked by similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// The passage text
    pub content: String,

    /// Where the passage came from (file name, URL, ...)
    pub source: String,

    /// Similarity score; higher is closer
    pub score: f32,
}

/// A semantic search backend.
///
/// An empty result means "no match", not failure. Connectivity and
/// embedding problems are reported through `SearchError`.
#[async_trait]
pub trait RetrievalService: Send + Sync {
    /// Backend name for logging (e.g., "qdrant", "in_memory").
    fn name(&self) -> &str;

    /// Return at most `top_k` passages, best first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>, SearchError>;
}
