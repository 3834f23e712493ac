//! Tool implementations for ChefAI.
//!
//! Each tool wraps one external collaborator behind the uniform
//! [`Tool`](chefai_core::Tool) interface:
//! recipe corpus search, live web search, question history, and the
//! session's dietary restrictions.

pub mod recipe_search;
pub mod retrieve_history;
pub mod set_dietary_restrictions;
pub mod tavily;
pub mod web_search;

use chefai_core::error::{SearchError, ToolError};
use chefai_core::history::HistoryStore;
use chefai_core::retrieval::RetrievalService;
use chefai_core::tool::{ToolKind, ToolRegistry};
use chefai_core::web::WebSearchService;
use std::sync::Arc;

pub use recipe_search::RecipeSearchTool;
pub use retrieve_history::RetrieveHistoryTool;
pub use set_dietary_restrictions::SetDietaryRestrictionsTool;
pub use tavily::TavilyClient;
pub use web_search::WebSearchTool;

/// The collaborators the tools delegate to, plus their fixed limits.
#[derive(Clone)]
pub struct ToolServices {
    pub retriever: Arc<dyn RetrievalService>,
    /// `None` leaves web search unregistered
    pub web: Option<Arc<dyn WebSearchService>>,
    pub history: Arc<dyn HistoryStore>,
    pub top_k: usize,
    pub web_results: usize,
    pub history_limit: usize,
}

/// Build the registry in advertisement order:
/// recipe_search, web_search, retrieve_history, set_dietary_restrictions.
pub fn default_registry(services: ToolServices) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RecipeSearchTool::new(services.retriever, services.top_k)));
    if let Some(web) = services.web {
        registry.register(Box::new(WebSearchTool::new(web, services.web_results)));
    }
    registry.register(Box::new(RetrieveHistoryTool::new(
        services.history,
        services.history_limit,
    )));
    registry.register(Box::new(SetDietaryRestrictionsTool));
    registry
}

/// Wrap a collaborator failure as a tool failure.
pub(crate) fn execution_failed(kind: ToolKind, error: SearchError) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: kind.name().to_string(),
        reason: error.to_string(),
    }
}
