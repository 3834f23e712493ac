//! Web search tool: live results from the configured search provider.
//!
//! Results are cut to a small fixed number to bound prompt size.

use async_trait::async_trait;
use chefai_core::error::ToolError;
use chefai_core::session::Session;
use chefai_core::tool::{Tool, ToolInput, ToolKind, ToolOutput};
use chefai_core::web::WebSearchService;
use std::sync::Arc;

pub struct WebSearchTool {
    service: Arc<dyn WebSearchService>,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(service: Arc<dyn WebSearchService>, max_results: usize) -> Self {
        Self {
            service,
            max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    async fn execute(&self, input: ToolInput, _session: &mut Session) -> Result<ToolOutput, ToolError> {
        let requested = input.kind();
        let ToolInput::WebSearch { query } = input else {
            return Err(ToolError::InvalidArguments(format!(
                "web_search cannot handle {:?} input",
                requested
            )));
        };

        let mut hits = self
            .service
            .search(&query, self.max_results)
            .await
            .map_err(|e| crate::execution_failed(self.kind(), e))?;

        // Providers may ignore the requested count.
        hits.truncate(self.max_results);
        Ok(ToolOutput::WebResults(hits))
    }
}
