//! Provider router: builds the chat and embedding providers from config.
//!
//! The chat model and the embedding model may live on different Azure
//! deployments (or even different resources), so they are built as two
//! independent providers.

use std::sync::Arc;
use chefai_config::{AppConfig, ProviderKind};
use chefai_core::error::ProviderError;
use chefai_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// The providers the application needs, plus the model names to request.
#[derive(Clone)]
pub struct ProviderSet {
    pub chat: Arc<dyn Provider>,
    pub chat_model: String,
    pub embeddings: Arc<dyn Provider>,
    pub embedding_model: String,
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet")
            .field("chat", &self.chat.name())
            .field("chat_model", &self.chat_model)
            .field("embeddings", &self.embeddings.name())
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

/// Build providers from configuration.
///
/// Azure requires an endpoint and a deployment; anything else missing
/// (typically the API key) surfaces on the first request instead.
pub fn build_from_config(config: &AppConfig) -> Result<ProviderSet, ProviderError> {
    let llm = &config.llm;
    let api_key = llm.api_key.clone().unwrap_or_default();

    let chat: Arc<dyn Provider> = match llm.provider {
        ProviderKind::Azure => {
            let endpoint = required(&llm.endpoint, "llm.endpoint (AZURE_OPENAI_ENDPOINT)")?;
            let deployment = llm.deployment.as_deref().unwrap_or(&llm.model);
            Arc::new(OpenAiCompatProvider::azure(
                endpoint,
                deployment,
                api_key.clone(),
                llm.api_version.clone(),
            ))
        }
        ProviderKind::Openai => Arc::new(openai_at(&llm.endpoint, api_key.clone())),
    };

    let emb = &config.embeddings;
    let emb_kind = emb.provider.unwrap_or(llm.provider);
    let emb_key = emb.api_key.clone().unwrap_or(api_key);
    let emb_endpoint = emb.endpoint.clone().or_else(|| llm.endpoint.clone());

    let embeddings: Arc<dyn Provider> = match emb_kind {
        ProviderKind::Azure => {
            let endpoint = required(&emb_endpoint, "embeddings.endpoint (AZURE_OPENAI_ENDPOINT_ADA)")?;
            let deployment = emb.deployment.as_deref().unwrap_or(&emb.model);
            Arc::new(OpenAiCompatProvider::azure(
                endpoint,
                deployment,
                emb_key,
                emb.api_version.clone(),
            ))
        }
        ProviderKind::Openai => Arc::new(openai_at(&emb_endpoint, emb_key)),
    };

    tracing::debug!(
        chat = %llm.provider,
        embeddings = %emb_kind,
        model = %llm.model,
        "Built providers"
    );

    Ok(ProviderSet {
        chat,
        chat_model: llm.model.clone(),
        embeddings,
        embedding_model: emb.model.clone(),
    })
}

fn openai_at(endpoint: &Option<String>, api_key: String) -> OpenAiCompatProvider {
    match endpoint {
        Some(url) => OpenAiCompatProvider::new("openai", url.as_str(), api_key),
        None => OpenAiCompatProvider::openai(api_key),
    }
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, ProviderError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ProviderError::NotConfigured(format!("{what} is required for Azure OpenAI")))
}
