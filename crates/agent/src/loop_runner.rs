//! The agent reasoning loop implementation.

use crate::prompt::PromptAssembler;
use chefai_core::error::{AgentError, ProviderError};
use chefai_core::event::{DomainEvent, EventBus};
use chefai_core::message::{Conversation, Message};
use chefai_core::provider::{Provider, ProviderRequest, ProviderResponse};
use chefai_core::session::Session;
use chefai_core::tool::{ToolCall, ToolInvocation, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The outcome of one successful run.
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Final answer text
    pub answer: String,

    /// Every tool call made during the run, in execution order
    pub invocations: Vec<ToolInvocation>,

    /// Reasoning calls used, including the one that produced the answer
    pub steps: u32,

    /// Model that produced the answer
    pub model: String,
}

/// The core agent loop that orchestrates LLM calls and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model (or deployment) to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Builds the instruction set for each step
    prompt: PromptAssembler,

    /// Maximum reasoning calls per run
    max_steps: u32,

    llm_timeout: Duration,
    tool_timeout: Duration,
    request_timeout: Duration,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            prompt: PromptAssembler::new(),
            max_steps: 15,
            llm_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(120),
            event_bus,
        }
    }

    /// Set the maximum number of reasoning calls per run.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_prompt(mut self, prompt: PromptAssembler) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Deadline for a whole run, across all steps.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer `question` within `session`.
    ///
    /// The session's restrictions shape every step's instructions, and the
    /// `set_dietary_restrictions` tool may change them mid-run. Tool
    /// failures never end the run; an unknown tool, the step budget, the
    /// request deadline and provider failures do.
    pub async fn run(&self, question: &str, session: &mut Session) -> chefai_core::Result<AgentRun> {
        let conversation_id = session.id.to_string();

        info!(
            conversation_id = %conversation_id,
            restrictions = %session.restrictions(),
            "Processing question"
        );
        self.event_bus.publish(DomainEvent::QuestionReceived {
            conversation_id: conversation_id.clone(),
            question_preview: question.chars().take(80).collect(),
            restrictions: session.restrictions().iter().map(|r| r.to_string()).collect(),
            timestamp: chrono::Utc::now(),
        });

        let outcome = match tokio::time::timeout(self.request_timeout, self.run_steps(question, session)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AgentError::Timeout {
                timeout_ms: self.request_timeout.as_millis() as u64,
            }
            .into()),
        };

        match &outcome {
            Ok((run, tokens_used)) => {
                info!(
                    conversation_id = %conversation_id,
                    steps = run.steps,
                    tool_calls = run.invocations.len(),
                    "Answer generated"
                );
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    conversation_id,
                    model: run.model.clone(),
                    tokens_used: *tokens_used,
                    steps: run.steps,
                    timestamp: chrono::Utc::now(),
                });
            }
            Err(e) => {
                error!(conversation_id = %conversation_id, error = %e, "Agent run failed");
                self.event_bus.publish(DomainEvent::RunFailed {
                    conversation_id,
                    error_message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
            }
        }

        outcome.map(|(run, _)| run)
    }

    async fn run_steps(
        &self,
        question: &str,
        session: &mut Session,
    ) -> chefai_core::Result<(AgentRun, Option<u32>)> {
        let mut conversation = Conversation::from_question(session.id.clone(), question);
        let tool_definitions = self.tools.definitions();
        let mut invocations = Vec::new();
        let mut tokens_used: Option<u32> = None;

        for step in 1..=self.max_steps {
            debug!(conversation_id = %conversation.id, step, "Agent loop step");

            // Restrictions may have changed during the previous step.
            let mut messages = self.prompt.assemble(session.restrictions()).to_messages();
            messages.extend(conversation.messages.iter().cloned());

            let request = ProviderRequest {
                model: self.model.clone(),
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.complete(request).await?;
            if let Some(usage) = &response.usage {
                tokens_used = Some(tokens_used.unwrap_or(0) + usage.total_tokens);
            }

            if !response.message.requests_tools() {
                let answer = response.message.content.clone();
                conversation.push(response.message);
                return Ok((
                    AgentRun {
                        answer,
                        invocations,
                        steps: step,
                        model: response.model,
                    },
                    tokens_used,
                ));
            }

            debug!(
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for tc in &tool_calls {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: tc.arguments.clone(),
                };

                let invocation = match self.tools.execute(&call, session, self.tool_timeout).await {
                    Ok(invocation) => invocation,
                    Err(e) => {
                        warn!(tool = %tc.name, "Model requested a tool that is not registered");
                        return Err(e.into());
                    }
                };

                debug!(
                    tool = %invocation.tool,
                    success = invocation.success,
                    duration_ms = invocation.duration_ms,
                    "Tool call finished"
                );
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    conversation_id: conversation.id.to_string(),
                    tool_name: invocation.tool.name().to_string(),
                    success: invocation.success,
                    duration_ms: invocation.duration_ms,
                    timestamp: chrono::Utc::now(),
                });

                conversation.push(Message::tool_result(&tc.id, &invocation.output));
                invocations.push(invocation);
            }
        }

        Err(AgentError::StepBudgetExhausted {
            max_steps: self.max_steps,
        }
        .into())
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match tokio::time::timeout(self.llm_timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "{} did not respond within {}ms",
                self.provider.name(),
                self.llm_timeout.as_millis()
            ))),
        }
    }
}
