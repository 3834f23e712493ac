//! Tavily search API client.
//!
//! `POST {base}/search` with a basic-depth query; each result's `content`
//! becomes the hit excerpt.

use async_trait::async_trait;
use chefai_core::error::SearchError;
use chefai_core::web::{WebSearchHit, WebSearchService};
use serde::Deserialize;
use tracing::debug;

const TAVILY_API_URL: &str = "https://api.tavily.com";

pub struct TavilyClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(TAVILY_API_URL, api_key)
    }

    /// Point the client at a different host (proxies, tests).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait]
impl WebSearchService for TavilyClient {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebSearchHit>, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::NotConfigured(
                "TAVILY_API_KEY is not set".into(),
            ));
        }

        debug!(query = %query, max_results, "Searching Tavily");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&serde_json::json!({
                "api_key": self.api_key,
                "query": query,
                "search_depth": "basic",
                "max_results": max_results,
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

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| WebSearchHit {
                title: r.title,
                url: r.url,
                excerpt: r.content,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let client = TavilyClient::new("");
        let err = client.search("pho", 3).await.unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn maps_results_to_hits() {
        let router = Router::new().route(
            "/search",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["api_key"], "tvly-test");
                assert_eq!(body["search_depth"], "basic");
                assert_eq!(body["max_results"], 3);
                Json(serde_json::json!({
                    "query": body["query"],
                    "results": [
                        {"title": "Vegan Brownies", "url": "https://example.com/brownies", "content": "Use flax eggs", "score": 0.9},
                        {"title": "GF Flour Guide", "url": "https://example.com/flour", "content": "Rice flour works", "score": 0.8}
                    ]
                }))
            }),
        );
        let base = serve(router).await;

        let client = TavilyClient::with_base_url(base, "tvly-test");
        let hits = client.search("vegan brownies", 3).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Vegan Brownies");
        assert_eq!(hits[0].excerpt, "Use flax eggs");
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let router = Router::new().route(
            "/search",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = serve(router).await;

        let client = TavilyClient::with_base_url(base, "tvly-test");
        let err = client.search("ramen", 3).await.unwrap_err();
        assert!(matches!(err, SearchError::ApiError { status_code: 502, .. }));
    }
}
