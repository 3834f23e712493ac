//! History tool: the user's most recent questions, newest first.

use async_trait::async_trait;
use chefai_core::error::ToolError;
use chefai_core::history::HistoryStore;
use chefai_core::session::Session;
use chefai_core::tool::{Tool, ToolInput, ToolKind, ToolOutput};
use std::sync::Arc;

pub struct RetrieveHistoryTool {
    store: Arc<dyn HistoryStore>,
    limit: usize,
}

impl RetrieveHistoryTool {
    pub fn new(store: Arc<dyn HistoryStore>, limit: usize) -> Self {
        Self { store, limit }
    }
}

#[async_trait]
impl Tool for RetrieveHistoryTool {
    fn kind(&self) -> ToolKind {
        ToolKind::RetrieveHistory
    }

    /// Input is ignored.
    async fn execute(&self, _input: ToolInput, _session: &mut Session) -> Result<ToolOutput, ToolError> {
        let records = self
            .store
            .recent(self.limit)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.kind().name().to_string(),
                reason: e.to_string(),
            })?;

        Ok(ToolOutput::History(
            records.into_iter().map(|r| r.question).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefai_core::history::HistoryRecord;
    use chefai_stores::InMemoryHistoryStore;

    #[tokio::test]
    async fn returns_bounded_recent_questions() {
        let store = Arc::new(InMemoryHistoryStore::new());
        for i in 0..7 {
            let mut record = HistoryRecord::new(format!("question {i}"));
            record.timestamp += chrono::Duration::seconds(i);
            store.append(record).await.unwrap();
        }

        let tool = RetrieveHistoryTool::new(store, 5);
        let mut session = Session::new();
        let output = tool
            .execute(ToolInput::RetrieveHistory, &mut session)
            .await
            .unwrap();

        match output {
            ToolOutput::History(questions) => {
                assert_eq!(questions.len(), 5);
                assert_eq!(questions[0], "question 6");
                assert_eq!(questions[4], "question 2");
            }
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_history_renders_friendly_text() {
        let tool = RetrieveHistoryTool::new(Arc::new(InMemoryHistoryStore::new()), 5);
        let mut session = Session::new();
        let output = tool
            .execute(ToolInput::RetrieveHistory, &mut session)
            .await
            .unwrap();
        assert_eq!(output.render(), "The user has no previous searches.");
    }
}
