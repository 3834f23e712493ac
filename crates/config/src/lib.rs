//! Configuration loading, validation, and management for ChefAI.
//!
//! Loads configuration from `~/.chefai/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.chefai/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat model used by the agent loop
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding model used by the recipe retriever
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Recipe corpus (vector store) settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Live web search settings
    #[serde(default)]
    pub web_search: WebSearchConfig,

    /// Question history and saved recipes
    #[serde(default)]
    pub history: HistoryConfig,

    /// Agent loop limits and prompt overrides
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

fn default_true() -> bool {
    true
}

/// Which API dialect a model endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Azure OpenAI deployment (`api-key` header, deployment path, `api-version`)
    Azure,
    /// Plain OpenAI-compatible endpoint with bearer auth
    Openai,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Azure => f.write_str("azure"),
            Self::Openai => f.write_str("openai"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: ProviderKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL. For Azure, the resource endpoint
    /// (e.g. `https://my-resource.openai.azure.com`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Azure deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,

    #[serde(default = "default_chat_api_version")]
    pub api_version: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_llm_provider() -> ProviderKind {
    ProviderKind::Openai
}
fn default_chat_api_version() -> String {
    "2024-02-01".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: None,
            endpoint: None,
            deployment: None,
            api_version: default_chat_api_version(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Embedding endpoint. Unset credentials fall back to the `llm` section.
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,

    #[serde(default = "default_embeddings_api_version")]
    pub api_version: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_embeddings_api_version() -> String {
    "2023-05-15".into()
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".into()
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            endpoint: None,
            deployment: None,
            api_version: default_embeddings_api_version(),
            model: default_embedding_model(),
        }
    }
}

impl std::fmt::Debug for EmbeddingsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalBackend {
    /// Qdrant over its REST API
    Qdrant,
    /// Process-local vectors; empty until documents are added
    InMemory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_retrieval_backend")]
    pub backend: RetrievalBackend,

    #[serde(default = "default_qdrant_host")]
    pub host: String,

    #[serde(default = "default_qdrant_port")]
    pub port: u16,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Passages returned per recipe search
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_retrieval_backend() -> RetrievalBackend {
    RetrievalBackend::Qdrant
}
fn default_qdrant_host() -> String {
    "localhost".into()
}
fn default_qdrant_port() -> u16 {
    6333
}
fn default_collection() -> String {
    "recipes".into()
}
fn default_top_k() -> usize {
    4
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: default_retrieval_backend(),
            host: default_qdrant_host(),
            port: default_qdrant_port(),
            collection: default_collection(),
            top_k: default_top_k(),
        }
    }
}

impl RetrievalConfig {
    /// Base URL of the Qdrant REST API.
    pub fn qdrant_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Tavily API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Web results are pasted into the prompt, so their count stays small.
pub const MAX_WEB_RESULTS: usize = 5;

fn default_max_results() -> usize {
    3
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            max_results: default_max_results(),
        }
    }
}

impl std::fmt::Debug for WebSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &redact(&self.api_key))
            .field("max_results", &self.max_results)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// `sqlite://...` URL, or `memory` for a process-local store
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Questions returned by the history tool
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_database_url() -> String {
    format!(
        "sqlite://{}?mode=rwc",
        AppConfig::config_dir().join("chefai.db").display()
    )
}
fn default_history_limit() -> usize {
    5
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Reasoning calls allowed per question
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,

    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// End-to-end deadline for one question
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Replace the built-in persona statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_override: Option<String>,
}

fn default_max_steps() -> u32 {
    15
}
fn default_llm_timeout() -> u64 {
    60
}
fn default_tool_timeout() -> u64 {
    20
}
fn default_request_timeout() -> u64 {
    120
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            llm_timeout_secs: default_llm_timeout(),
            tool_timeout_secs: default_tool_timeout(),
            request_timeout_secs: default_request_timeout(),
            persona_override: None,
        }
    }
}

impl AgentConfig {
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.chefai/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides (highest priority).
    ///
    /// Variable names follow the Azure OpenAI deployment conventions, so an
    /// existing `.env` for the service works unchanged.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Chat model
        if let Some(key) = var("AZURE_OPENAI_API_KEY") {
            self.llm.provider = ProviderKind::Azure;
            self.llm.api_key = Some(key);
        } else if self.llm.api_key.is_none() {
            self.llm.api_key = var("OPENAI_API_KEY");
        }
        if let Some(endpoint) = var("AZURE_OPENAI_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }
        if let Some(deployment) = var("AZURE_OPENAI_DEPLOYMENT") {
            self.llm.deployment = Some(deployment);
        }
        if let Some(version) = var("OPENAI_API_VERSION") {
            self.llm.api_version = version;
        }
        if let Some(model) = var("CHEFAI_MODEL") {
            self.llm.model = model;
        }

        // Embeddings
        if let Some(key) = var("AZURE_OPENAI_API_KEY_ADA") {
            self.embeddings.provider = Some(ProviderKind::Azure);
            self.embeddings.api_key = Some(key);
        }
        if let Some(endpoint) = var("AZURE_OPENAI_ENDPOINT_ADA") {
            self.embeddings.endpoint = Some(endpoint);
        }
        if let Some(deployment) = var("AZURE_OPENAI_DEPLOYMENT_ADA") {
            self.embeddings.deployment = Some(deployment);
        }
        if let Some(version) = var("AZURE_OPENAI_API_VERSION_ADA") {
            self.embeddings.api_version = version;
        }

        // Web search
        if let Some(key) = var("TAVILY_API_KEY") {
            self.web_search.api_key = Some(key);
        }

        // Vector store
        if let Some(host) = var("QDRANT_HOST") {
            self.retrieval.host = host;
        }
        if let Some(port) = var("QDRANT_PORT") {
            match port.trim().parse() {
                Ok(port) => self.retrieval.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid QDRANT_PORT"),
            }
        }
        if let Some(collection) = var("QDRANT_COLLECTION_NAME") {
            self.retrieval.collection = collection;
        }

        // History
        if let Some(url) = var("CHEFAI_DATABASE_URL") {
            self.history.database_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chefai")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }

        if self.agent.llm_timeout_secs == 0
            || self.agent.tool_timeout_secs == 0
            || self.agent.request_timeout_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "agent timeouts must be greater than 0".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.web_search.max_results == 0 || self.web_search.max_results > MAX_WEB_RESULTS {
            return Err(ConfigError::ValidationError(format!(
                "web_search.max_results must be between 1 and {MAX_WEB_RESULTS}"
            )));
        }

        Ok(())
    }

    /// Check if a chat API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.llm.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for chefai_core::Error {
    fn from(e: ConfigError) -> Self {
        chefai_core::Error::Config {
            message: e.to_string(),
        }
    }
}
