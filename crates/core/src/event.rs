//! Domain event system: decoupled communication between bounded contexts.
//!
//! The agent loop publishes an event when a question arrives, after every
//! tool invocation, and when a run ends. Subscribers (logging, the CLI's
//! verbose mode, tests) react without the loop knowing about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A question entered the agent loop
    QuestionReceived {
        conversation_id: String,
        question_preview: String,
        restrictions: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolExecuted {
        conversation_id: String,
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The agent produced a final answer
    ResponseGenerated {
        conversation_id: String,
        model: String,
        tokens_used: Option<u32>,
        steps: u32,
        timestamp: DateTime<Utc>,
    },

    /// The run ended without an answer
    RunFailed {
        conversation_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
