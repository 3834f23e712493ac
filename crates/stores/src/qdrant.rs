//! Qdrant retriever over the REST API.
//!
//! Embeds the query through the configured embedding provider, then calls
//! `POST /collections/{name}/points/search`. Payloads follow the layout the
//! corpus was indexed with: `page_content` holds the passage text and
//! `metadata.source` where it came from.

use async_trait::async_trait;
use chefai_core::error::SearchError;
use chefai_core::provider::{EmbeddingRequest, Provider};
use chefai_core::retrieval::{RetrievalService, ScoredDocument};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub struct QdrantRetriever {
    base_url: String,
    collection: String,
    embedder: Arc<dyn Provider>,
    embedding_model: String,
    client: reqwest::Client,
}

impl QdrantRetriever {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        embedder: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            embedder,
            embedding_model: embedding_model.into(),
            client,
        }
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, SearchError> {
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(|e| SearchError::EmbeddingFailed(e.to_string()))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::EmbeddingFailed("no embedding returned for query".into()))
    }
}

#[async_trait]
impl RetrievalService for QdrantRetriever {
    fn name(&self) -> &str {
        "qdrant"
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>, SearchError> {
        let vector = self.embed_query(query).await?;
        let url = format!("{}/collections/{}/points/search", self.base_url, self.collection);

        debug!(collection = %self.collection, top_k, "Searching Qdrant");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "vector": vector,
                "limit": top_k,
                "with_payload": true,
            }))
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status_code: status,
                message: body,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload?;
                Some(ScoredDocument {
                    content: payload.page_content?,
                    source: payload
                        .metadata
                        .and_then(|m| m.source)
                        .unwrap_or_else(|| "unknown".into()),
                    score: point.score,
                })
            })
            .collect())
    }
}

// --- Qdrant REST types (internal) ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    page_content: Option<String>,
    metadata: Option<PayloadMetadata>,
}

#[derive(Debug, Deserialize)]
struct PayloadMetadata {
    source: Option<String>,
}
