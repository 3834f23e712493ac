//! OpenAI-compatible provider implementation.
//!
//! Speaks two dialects of the same API:
//! - plain OpenAI (`/v1/chat/completions`, bearer auth)
//! - Azure OpenAI deployments (`/openai/deployments/{name}/...`,
//!   `api-key` header, `api-version` query parameter)
//!
//! Supports chat completions with tool calling, and embeddings.

use async_trait::async_trait;
use chefai_core::error::ProviderError;
use chefai_core::message::{Message, MessageToolCall, Role};
use chefai_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How requests are addressed and authenticated.
#[derive(Debug, Clone, PartialEq)]
enum Dialect {
    OpenAi,
    Azure { api_version: String },
}

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    dialect: Dialect,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider for any OpenAI-compatible base URL (ending in `/v1`).
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            dialect: Dialect::OpenAi,
            client: http_client(),
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create a provider bound to one Azure OpenAI deployment.
    pub fn azure(
        endpoint: &str,
        deployment: &str,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            name: "azure".into(),
            base_url: format!(
                "{}/openai/deployments/{}",
                endpoint.trim_end_matches('/'),
                deployment
            ),
            api_key: api_key.into(),
            dialect: Dialect::Azure {
                api_version: api_version.into(),
            },
            client: http_client(),
        }
    }

    /// Full URL for an API path such as `chat/completions`.
    fn url(&self, path: &str) -> String {
        match &self.dialect {
            Dialect::OpenAi => format!("{}/{}", self.base_url, path),
            Dialect::Azure { api_version } => {
                format!("{}/{}?api-version={}", self.base_url, path, api_version)
            }
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.dialect {
            Dialect::OpenAi => builder.header("Authorization", format!("Bearer {}", self.api_key)),
            Dialect::Azure { .. } => builder.header("api-key", &self.api_key),
        }
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .authorize(self.client.post(self.url(path)))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        Ok(response)
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    Role::Tool => "tool".into(),
                },
                content: Some(m.content.clone()),
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl chefai_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self.post_json("chat/completions", &body).await?;

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let mut message = Message::assistant(choice.message.content.unwrap_or_default());
        message.tool_calls = tool_calls;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message,
            usage,
            model: api_response.model.unwrap_or(request.model),
        })
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        let body = serde_json::json!({
            "model": request.model,
            "input": request.inputs,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %request.model,
            count = request.inputs.len(),
            "Sending embedding request"
        );

        let response = self.post_json("embeddings", &body).await?;

        let api_resp: EmbeddingApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse embedding response: {e}"),
            })?;

        let embeddings = api_resp.data.into_iter().map(|d| d.embedding).collect();

        let usage = api_resp.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: 0,
            total_tokens: u.total_tokens,
        });

        Ok(EmbeddingResponse {
            embeddings,
            model: api_resp.model.unwrap_or(request.model),
            usage,
        })
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    /// Azure omits this on some API versions
    model: Option<String>,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// --- Embedding API types ---

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
    model: Option<String>,
    usage: Option<EmbeddingApiUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use chefai_core::Provider;
    use std::collections::HashMap;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn openai_constructor() {
        let provider = OpenAiCompatProvider::openai("sk-test");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.url("chat/completions"), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn azure_urls_carry_deployment_and_version() {
        let provider = OpenAiCompatProvider::azure(
            "https://chef.openai.azure.com/",
            "gpt-4o",
            "key",
            "2024-02-01",
        );
        assert_eq!(provider.name(), "azure");
        assert_eq!(
            provider.url("chat/completions"),
            "https://chef.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
    }

    #[test]
    fn message_conversion() {
        let messages = vec![Message::system("You are an AI chef"), Message::user("Hello")];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
    }

    #[test]
    fn message_conversion_with_tool_calls() {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "recipe_search".into(),
            arguments: r#"{"query":"chocolate cake"}"#.into(),
        }];
        let api_msgs = OpenAiCompatProvider::to_api_messages(&[msg]);
        let tc = api_msgs[0].tool_calls.as_ref().unwrap();
        assert_eq!(tc.len(), 1);
        assert_eq!(tc[0].function.name, "recipe_search");
    }

    #[test]
    fn tool_definition_conversion() {
        let tools = vec![ToolDefinition {
            name: "web_search".into(),
            description: "Searches the web".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let api_tools = OpenAiCompatProvider::to_api_tools(&tools);
        assert_eq!(api_tools.len(), 1);
        assert_eq!(api_tools[0].function.name, "web_search");
        assert_eq!(api_tools[0].r#type, "function");
    }

    #[test]
    fn parse_embedding_response_without_model() {
        let data = r#"{
            "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}],
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }"#;
        let parsed: EmbeddingApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2, 0.3]);
        assert!(parsed.model.is_none());
    }

    #[tokio::test]
    async fn azure_chat_sends_api_key_header_and_parses_tool_calls() {
        let router = Router::new().route(
            "/openai/deployments/{deployment}/chat/completions",
            post(
                |Path(deployment): Path<String>,
                 Query(query): Query<HashMap<String, String>>,
                 headers: HeaderMap,
                 Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(deployment, "gpt-4o");
                    assert_eq!(query.get("api-version").map(String::as_str), Some("2024-02-01"));
                    assert_eq!(headers.get("api-key").unwrap(), "azure-key");
                    assert!(headers.get("authorization").is_none());
                    assert_eq!(body["tools"][0]["function"]["name"], "recipe_search");

                    Json(serde_json::json!({
                        "choices": [{
                            "message": {
                                "role": "assistant",
                                "content": null,
                                "tool_calls": [{
                                    "id": "call_7",
                                    "type": "function",
                                    "function": {
                                        "name": "recipe_search",
                                        "arguments": "{\"query\":\"chocolate cake\"}"
                                    }
                                }]
                            }
                        }],
                        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
                    }))
                },
            ),
        );
        let base = serve(router).await;

        let provider = OpenAiCompatProvider::azure(&base, "gpt-4o", "azure-key", "2024-02-01");
        let response = provider
            .complete(ProviderRequest {
                model: "gpt-4o".into(),
                messages: vec![Message::user("What is the recipe for a chocolate cake?")],
                temperature: 0.2,
                max_tokens: None,
                tools: vec![ToolDefinition {
                    name: "recipe_search".into(),
                    description: "Searches recipes".into(),
                    parameters: serde_json::json!({"type": "object"}),
                }],
            })
            .await
            .unwrap();

        assert_eq!(response.model, "gpt-4o");
        assert!(response.message.requests_tools());
        assert_eq!(response.message.tool_calls[0].id, "call_7");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let router = Router::new().route(
            "/v1/embeddings",
            post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "nope") }),
        );
        let base = serve(router).await;

        let provider = OpenAiCompatProvider::new("openai", format!("{base}/v1"), "bad");
        let err = provider
            .embed(EmbeddingRequest {
                model: "text-embedding-ada-002".into(),
                inputs: vec!["pancakes".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn embeddings_round_trip_through_bearer_endpoint() {
        let router = Router::new().route(
            "/v1/embeddings",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers.get("authorization").unwrap(), "Bearer sk-test");
                assert_eq!(body["input"][0], "pancakes");
                Json(serde_json::json!({
                    "data": [{"embedding": [0.5, 0.5], "index": 0}],
                    "model": "text-embedding-ada-002",
                }))
            }),
        );
        let base = serve(router).await;

        let provider = OpenAiCompatProvider::new("openai", format!("{base}/v1"), "sk-test");
        let response = provider
            .embed(EmbeddingRequest {
                model: "text-embedding-ada-002".into(),
                inputs: vec!["pancakes".into()],
            })
            .await
            .unwrap();
        assert_eq!(response.embeddings, vec![vec![0.5, 0.5]]);
    }
}
