//! Error types for the ChefAI domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all ChefAI operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Search errors ---
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Agent run errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Failures of the retrieval and web search collaborators.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search service not configured: {0}")]
    NotConfigured(String),

    #[error("Search request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Malformed search response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Fatal conditions that end an agent run.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// The engine asked for a tool the registry does not advertise.
    #[error("Model requested unknown tool '{name}' (available: {available})")]
    UnknownTool { name: String, available: String },

    #[error("Agent did not produce an answer within {max_steps} reasoning steps")]
    StepBudgetExhausted { max_steps: u32 },

    #[error("Agent run exceeded the {timeout_ms}ms request deadline")]
    Timeout { timeout_ms: u64 },
}

impl Error {
    /// Message safe to show to an end user; technical detail stays in logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Agent(AgentError::StepBudgetExhausted { .. }) => {
                "Sorry, I couldn't work out an answer to that question. Please try rephrasing it."
            }
            Error::Agent(AgentError::Timeout { .. }) | Error::Provider(ProviderError::Timeout(_)) => {
                "Sorry, the assistant took too long to respond. Please try again."
            }
            _ => "Sorry, something went wrong while preparing your answer. Please try again later.",
        }
    }
}
