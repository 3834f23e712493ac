//! In-process vector index over recipe passages.
//!
//! Embeds documents through the configured provider when they are added,
//! then ranks by cosine similarity at query time. Backs the retriever when
//! no Qdrant instance is available, and the tests.

use async_trait::async_trait;
use chefai_core::error::SearchError;
use chefai_core::provider::{EmbeddingRequest, Provider};
use chefai_core::retrieval::{RetrievalService, ScoredDocument};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the lengths differ or either vector is empty or zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

struct IndexedPassage {
    content: String,
    source: String,
    embedding: Vec<f32>,
}

pub struct InMemoryRetriever {
    embedder: Arc<dyn Provider>,
    model: String,
    passages: RwLock<Vec<IndexedPassage>>,
}

impl InMemoryRetriever {
    pub fn new(embedder: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            embedder,
            model: model.into(),
            passages: RwLock::new(Vec::new()),
        }
    }

    /// Embed and index `(content, source)` pairs.
    pub async fn add_documents(&self, documents: Vec<(String, String)>) -> Result<usize, SearchError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let inputs: Vec<String> = documents.iter().map(|(content, _)| content.clone()).collect();
        let embeddings = self.embed(inputs).await?;
        if embeddings.len() != documents.len() {
            return Err(SearchError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut passages = self.passages.write().await;
        for ((content, source), embedding) in documents.into_iter().zip(embeddings) {
            passages.push(IndexedPassage {
                content,
                source,
                embedding,
            });
        }
        Ok(passages.len())
    }

    pub async fn len(&self) -> usize {
        self.passages.read().await.len()
    }

    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, SearchError> {
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs,
            })
            .await
            .map_err(|e| SearchError::EmbeddingFailed(e.to_string()))?;
        Ok(response.embeddings)
    }
}

#[async_trait]
impl RetrievalService for InMemoryRetriever {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>, SearchError> {
        if self.passages.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embed(vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::EmbeddingFailed("no embedding returned for query".into()))?;

        let passages = self.passages.read().await;
        let mut scored: Vec<ScoredDocument> = passages
            .iter()
            .map(|p| ScoredDocument {
                content: p.content.clone(),
                source: p.source.clone(),
                score: cosine_similarity(&p.embedding, &query_embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefai_core::error::ProviderError;
    use chefai_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};

    /// Embeds text as keyword counts over a tiny fixed vocabulary.
    struct KeywordEmbedder;

    const VOCAB: [&str; 4] = ["chocolate", "cake", "salad", "soup"];

    #[async_trait]
    impl Provider for KeywordEmbedder {
        fn name(&self) -> &str {
            "keyword"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("embeddings only".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            let embeddings = request
                .inputs
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    VOCAB.iter().map(|w| lower.matches(w).count() as f32).collect()
                })
                .collect();
            Ok(EmbeddingResponse {
                embeddings,
                model: request.model,
                usage: None,
            })
        }
    }

    #[test]
    fn cosine_identical_vectors() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_and_mismatched() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let retriever = InMemoryRetriever::new(Arc::new(KeywordEmbedder), "kw");
        retriever
            .add_documents(vec![
                ("Tomato soup with basil".into(), "soup.txt".into()),
                ("Chocolate cake: cocoa, flour, sugar".into(), "cake.txt".into()),
                ("Greek salad".into(), "salad.txt".into()),
            ])
            .await
            .unwrap();
        assert_eq!(retriever.len().await, 3);

        let results = retriever.search("chocolate cake", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "cake.txt");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn empty_index_returns_no_documents() {
        let retriever = InMemoryRetriever::new(Arc::new(KeywordEmbedder), "kw");
        assert!(retriever.search("anything", 4).await.unwrap().is_empty());
    }
}
