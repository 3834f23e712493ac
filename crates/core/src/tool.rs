//! Tool abstraction: the closed set of capabilities the agent can call.
//!
//! The model picks tools by name. That name is mapped onto [`ToolKind`]
//! once, and the registry refuses anything it does not advertise. Inputs
//! and outputs are typed per kind; only the final observation is text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use crate::dietary::DietaryRestrictionSet;
use crate::error::{AgentError, ToolError};
use crate::provider::ToolDefinition;
use crate::retrieval::ScoredDocument;
use crate::session::Session;
use crate::web::WebSearchHit;

/// Every tool the agent knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    RecipeSearch,
    WebSearch,
    RetrieveHistory,
    SetDietaryRestrictions,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        Self::RecipeSearch,
        Self::WebSearch,
        Self::RetrieveHistory,
        Self::SetDietaryRestrictions,
    ];

    /// The name advertised to the model.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RecipeSearch => "recipe_search",
            Self::WebSearch => "web_search",
            Self::RetrieveHistory => "retrieve_history",
            Self::SetDietaryRestrictions => "set_dietary_restrictions",
        }
    }

    /// Description the model uses to decide when a tool applies.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RecipeSearch => {
                "Searches a vector database for relevant recipes and cooking information"
            }
            Self::WebSearch => {
                "Searches the web for additional, real-time recipe information and cooking tips"
            }
            Self::RetrieveHistory => "Retrieves the user's recent recipe search history",
            Self::SetDietaryRestrictions => {
                "Sets dietary restrictions for recipe filtering based on the user's preferences. \
                 Input is a comma-separated list drawn from: vegetarian, vegan, gluten-free, \
                 dairy-free, nut-free, halal, kosher. An empty list clears all restrictions."
            }
        }
    }

    /// JSON Schema for the tool's arguments.
    pub fn parameters_schema(&self) -> serde_json::Value {
        match self {
            Self::RecipeSearch | Self::WebSearch => serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for"
                    }
                },
                "required": ["query"]
            }),
            Self::RetrieveHistory => serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            Self::SetDietaryRestrictions => serde_json::json!({
                "type": "object",
                "properties": {
                    "restrictions": {
                        "type": "string",
                        "description": "Comma-separated restrictions, e.g. \"vegan, gluten-free\""
                    }
                },
                "required": ["restrictions"]
            }),
        }
    }

    /// Exact-name lookup. No fuzzy matching.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }

    /// Observation text used when an invocation of this tool fails.
    pub fn failure_observation(&self, error: &ToolError) -> String {
        let activity = match self {
            Self::RecipeSearch => "recipe search",
            Self::WebSearch => "web search",
            Self::RetrieveHistory => "history retrieval",
            Self::SetDietaryRestrictions => "dietary restriction update",
        };
        format!("An error occurred during the {activity}: {error}")
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed arguments for one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    RecipeSearch { query: String },
    WebSearch { query: String },
    RetrieveHistory,
    SetDietaryRestrictions { restrictions: String },
}

impl ToolInput {
    /// Decode the model's JSON arguments for `kind`.
    ///
    /// A bare JSON string is accepted as the single argument. History
    /// retrieval ignores its input entirely. Only an explicit empty or
    /// blank restriction list clears the set; `null` or a missing key is
    /// rejected.
    pub fn parse(kind: ToolKind, arguments: &serde_json::Value) -> Result<Self, ToolError> {
        match kind {
            ToolKind::RecipeSearch => Ok(Self::RecipeSearch {
                query: required_text(arguments, "query")?,
            }),
            ToolKind::WebSearch => Ok(Self::WebSearch {
                query: required_text(arguments, "query")?,
            }),
            ToolKind::RetrieveHistory => Ok(Self::RetrieveHistory),
            ToolKind::SetDietaryRestrictions => {
                let value = match arguments {
                    serde_json::Value::String(_) => arguments,
                    other => other.get("restrictions").ok_or_else(|| {
                        ToolError::InvalidArguments("Missing required 'restrictions' argument".into())
                    })?,
                };
                let restrictions = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|v| {
                            v.as_str().ok_or_else(|| {
                                ToolError::InvalidArguments(format!(
                                    "'restrictions' entries must be strings, got {v}"
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?
                        .join(","),
                    other => {
                        return Err(ToolError::InvalidArguments(format!(
                            "'restrictions' must be a string or a list of strings, got {other}"
                        )))
                    }
                };
                Ok(Self::SetDietaryRestrictions { restrictions })
            }
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::RecipeSearch { .. } => ToolKind::RecipeSearch,
            Self::WebSearch { .. } => ToolKind::WebSearch,
            Self::RetrieveHistory => ToolKind::RetrieveHistory,
            Self::SetDietaryRestrictions { .. } => ToolKind::SetDietaryRestrictions,
        }
    }
}

fn required_text(arguments: &serde_json::Value, field: &str) -> Result<String, ToolError> {
    let value = match arguments {
        serde_json::Value::String(s) => Some(s.as_str()),
        other => other.get(field).and_then(|v| v.as_str()),
    };
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ToolError::InvalidArguments(format!(
            "Missing required '{field}' argument"
        ))),
    }
}

/// Typed result of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Recipes(Vec<ScoredDocument>),
    WebResults(Vec<WebSearchHit>),
    History(Vec<String>),
    RestrictionsUpdated(DietaryRestrictionSet),
    /// Non-blank input where no token was in the vocabulary; the set is now empty.
    RestrictionsUnrecognised(String),
}

impl ToolOutput {
    /// Render as the observation text the model reads next turn.
    pub fn render(&self) -> String {
        match self {
            Self::Recipes(docs) if docs.is_empty() => "No matching recipes found.".into(),
            Self::Recipes(docs) => docs
                .iter()
                .map(|d| format!("Source: {}\n{}", d.source, d.content))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::WebResults(hits) if hits.is_empty() => "No web results found.".into(),
            Self::WebResults(hits) => hits
                .iter()
                .map(|h| format!("- {}: {}", h.title, h.excerpt))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::History(questions) if questions.is_empty() => {
                "The user has no previous searches.".into()
            }
            Self::History(questions) => {
                let lines: Vec<String> = questions.iter().map(|q| format!("- {q}")).collect();
                format!("Recent searches (newest first):\n{}", lines.join("\n"))
            }
            Self::RestrictionsUpdated(set) if set.is_empty() => "Dietary restrictions cleared".into(),
            Self::RestrictionsUpdated(set) => {
                format!("Successfully set dietary restrictions: {}", set.joined())
            }
            Self::RestrictionsUnrecognised(requested) => format!(
                "No recognised dietary restrictions in '{}'; restrictions cleared",
                requested.trim()
            ),
        }
    }
}

/// A tool call as requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Tool name exactly as the model emitted it
    pub name: String,

    /// Arguments exactly as the model emitted them (a JSON document)
    pub arguments: String,
}

impl ToolCall {
    /// Decode the raw argument text. Blank text means no arguments.
    pub fn decode_arguments(&self) -> Result<serde_json::Value, ToolError> {
        if self.arguments.trim().is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(&self.arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
    }
}

/// One executed call: what was asked, and what came back.
///
/// Kept for observability and saved alongside recipes; the loop does not
/// branch on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub call_id: String,
    pub tool: ToolKind,
    /// Decoded arguments, or the raw text as a JSON string when it did not decode
    pub arguments: serde_json::Value,
    /// Observation text (the rendered output or the error description)
    pub output: String,
    pub success: bool,
    pub duration_ms: u64,
}

/// A capability backed by some external service.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which kind this implementation serves.
    fn kind(&self) -> ToolKind;

    /// Run the tool. `session` is the state of the request being served.
    async fn execute(
        &self,
        input: ToolInput,
        session: &mut Session,
    ) -> std::result::Result<ToolOutput, ToolError>;
}

/// The fixed, ordered set of tools advertised to the model.
///
/// Registration order is advertisement order. At most one tool per kind.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces an existing tool of the same kind in place.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.kind() == tool.kind()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: Box<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn kinds(&self) -> Vec<ToolKind> {
        self.tools.iter().map(|t| t.kind()).collect()
    }

    /// List all registered tool names, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.kind().name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool definitions (for sending to the LLM), in order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.kind().to_definition()).collect()
    }

    /// Map a model-emitted name to a registered tool.
    ///
    /// A name that is not advertised, including a known kind that simply
    /// was not registered, is an [`AgentError::UnknownTool`].
    pub fn resolve(&self, name: &str) -> Result<&dyn Tool, AgentError> {
        ToolKind::from_name(name)
            .and_then(|kind| self.tools.iter().find(|t| t.kind() == kind))
            .map(|t| t.as_ref())
            .ok_or_else(|| AgentError::UnknownTool {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Execute a tool call under `timeout`.
    ///
    /// Only an unknown tool name is an error. Bad arguments, tool failures
    /// and timeouts all come back as an unsuccessful [`ToolInvocation`]
    /// whose output describes the problem.
    pub async fn execute(
        &self,
        call: &ToolCall,
        session: &mut Session,
        timeout: Duration,
    ) -> Result<ToolInvocation, AgentError> {
        let tool = self.resolve(&call.name)?;
        let kind = tool.kind();
        let start = Instant::now();

        let decoded = call.decode_arguments();
        let arguments = match &decoded {
            Ok(value) => value.clone(),
            Err(_) => serde_json::Value::String(call.arguments.clone()),
        };

        let outcome = match decoded.and_then(|value| ToolInput::parse(kind, &value)) {
            Ok(input) => match tokio::time::timeout(timeout, tool.execute(input, session)).await {
                Ok(result) => result,
                Err(_) => Err(ToolError::Timeout {
                    tool_name: kind.name().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            },
            Err(e) => Err(e),
        };

        let (output, success) = match outcome {
            Ok(output) => (output.render(), true),
            Err(e) => {
                tracing::warn!(tool = %kind, error = %e, "Tool call failed");
                (kind.failure_observation(&e), false)
            }
        };

        Ok(ToolInvocation {
            call_id: call.id.clone(),
            tool: kind,
            arguments,
            output,
            success,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Echoes the query back as a single recipe.
    struct EchoRecipes;

    #[async_trait]
    impl Tool for EchoRecipes {
        fn kind(&self) -> ToolKind {
            ToolKind::RecipeSearch
        }

        async fn execute(&self, input: ToolInput, _session: &mut Session) -> Result<ToolOutput, ToolError> {
            let ToolInput::RecipeSearch { query } = input else {
                return Err(ToolError::InvalidArguments("wrong input".into()));
            };
            Ok(ToolOutput::Recipes(vec![ScoredDocument {
                content: format!("Recipe for {query}"),
                source: "echo.txt".into(),
                score: 1.0,
            }]))
        }
    }

    struct BrokenWeb;

    #[async_trait]
    impl Tool for BrokenWeb {
        fn kind(&self) -> ToolKind {
            ToolKind::WebSearch
        }

        async fn execute(&self, _input: ToolInput, _session: &mut Session) -> Result<ToolOutput, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: "connection refused".into(),
            })
        }
    }

    struct SlowHistory;

    #[async_trait]
    impl Tool for SlowHistory {
        fn kind(&self) -> ToolKind {
            ToolKind::RetrieveHistory
        }

        async fn execute(&self, _input: ToolInput, _session: &mut Session) -> Result<ToolOutput, ToolError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ToolOutput::History(vec![]))
        }
    }

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        raw_call(name, &arguments.to_string())
    }

    fn raw_call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[test]
    fn names_round_trip_through_lookup() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("Recipe_Search"), None);
    }

    #[test]
    fn registry_preserves_registration_order() {
        let registry = ToolRegistry::new()
            .with(Box::new(BrokenWeb))
            .with(Box::new(EchoRecipes))
            .with(Box::new(EchoRecipes));
        assert_eq!(registry.names(), vec!["web_search", "recipe_search"]);

        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].description, ToolKind::RecipeSearch.description());
    }

    #[test]
    fn resolve_rejects_unregistered_kinds() {
        let registry = ToolRegistry::new().with(Box::new(EchoRecipes));
        let err = registry.resolve("web_search").err().unwrap();
        match err {
            AgentError::UnknownTool { name, available } => {
                assert_eq!(name, "web_search");
                assert_eq!(available, "recipe_search");
            }
            other => panic!("expected UnknownTool, got {other:?}"),
        }
    }

    #[test]
    fn parse_accepts_bare_string_arguments() {
        let input = ToolInput::parse(ToolKind::WebSearch, &json!("vegan lasagna")).unwrap();
        assert_eq!(input, ToolInput::WebSearch { query: "vegan lasagna".into() });

        let input = ToolInput::parse(ToolKind::RetrieveHistory, &json!({"anything": 1})).unwrap();
        assert_eq!(input, ToolInput::RetrieveHistory);

        let input =
            ToolInput::parse(ToolKind::SetDietaryRestrictions, &json!({"restrictions": ["vegan", "halal"]}))
                .unwrap();
        assert_eq!(input, ToolInput::SetDietaryRestrictions { restrictions: "vegan,halal".into() });
    }

    #[test]
    fn parse_only_clears_restrictions_on_explicit_blank_input() {
        let blank = ToolInput::parse(ToolKind::SetDietaryRestrictions, &json!({"restrictions": " "})).unwrap();
        assert_eq!(blank, ToolInput::SetDietaryRestrictions { restrictions: " ".into() });
        let empty = ToolInput::parse(ToolKind::SetDietaryRestrictions, &json!({"restrictions": []})).unwrap();
        assert_eq!(empty, ToolInput::SetDietaryRestrictions { restrictions: String::new() });

        for arguments in [json!(null), json!({}), json!({"restrictions": null}), json!({"restrictions": 7}), json!({"restrictions": ["vegan", 1]})] {
            let err = ToolInput::parse(ToolKind::SetDietaryRestrictions, &arguments).unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)), "accepted {arguments}");
        }
    }

    #[test]
    fn decode_arguments_treats_blank_as_empty_object() {
        assert_eq!(raw_call("retrieve_history", "").decode_arguments().unwrap(), json!({}));
        let err = raw_call("set_dietary_restrictions", r#"{"restrictions": "vegan"#)
            .decode_arguments()
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn parse_rejects_blank_query() {
        let err = ToolInput::parse(ToolKind::RecipeSearch, &json!({"query": "   "})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn render_restriction_messages() {
        let cleared = ToolOutput::RestrictionsUpdated(DietaryRestrictionSet::new());
        assert_eq!(cleared.render(), "Dietary restrictions cleared");

        let set = ToolOutput::RestrictionsUpdated(DietaryRestrictionSet::parse_list("kosher, vegan"));
        assert_eq!(set.render(), "Successfully set dietary restrictions: vegan, kosher");

        let unrecognised = ToolOutput::RestrictionsUnrecognised(" paleo ".into());
        assert_eq!(
            unrecognised.render(),
            "No recognised dietary restrictions in 'paleo'; restrictions cleared"
        );
    }

    #[test]
    fn render_web_results_as_title_excerpt_lines() {
        let out = ToolOutput::WebResults(vec![WebSearchHit {
            title: "Brownies".into(),
            url: "https://example.com".into(),
            excerpt: "Fudgy and rich".into(),
        }]);
        assert_eq!(out.render(), "- Brownies: Fudgy and rich");
    }

    #[tokio::test]
    async fn execute_successful_call() {
        let registry = ToolRegistry::new().with(Box::new(EchoRecipes));
        let mut session = Session::new();
        let inv = registry
            .execute(&call("recipe_search", json!({"query": "pancakes"})), &mut session, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(inv.success);
        assert_eq!(inv.tool, ToolKind::RecipeSearch);
        assert!(inv.output.contains("Recipe for pancakes"));
    }

    #[tokio::test]
    async fn execute_folds_failure_into_observation() {
        let registry = ToolRegistry::new().with(Box::new(BrokenWeb));
        let mut session = Session::new();
        let inv = registry
            .execute(&call("web_search", json!({"query": "pancakes"})), &mut session, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!inv.success);
        assert!(inv.output.starts_with("An error occurred during the web search:"));
        assert!(inv.output.contains("connection refused"));
    }

    #[tokio::test]
    async fn execute_bad_arguments_is_observation_not_error() {
        let registry = ToolRegistry::new().with(Box::new(EchoRecipes));
        let mut session = Session::new();
        let inv = registry
            .execute(&call("recipe_search", json!({})), &mut session, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!inv.success);
        assert!(inv.output.contains("query"));
    }

    #[tokio::test]
    async fn execute_undecodable_arguments_is_observation_not_error() {
        let registry = ToolRegistry::new().with(Box::new(EchoRecipes));
        let mut session = Session::new();
        let inv = registry
            .execute(&raw_call("recipe_search", r#"{"query": "pan"#), &mut session, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!inv.success);
        assert!(inv.output.contains("not valid JSON"));
        assert_eq!(inv.arguments, json!(r#"{"query": "pan"#));
    }

    #[tokio::test(start_paused = true)]
    async fn execute_times_out_as_failure() {
        let registry = ToolRegistry::new().with(Box::new(SlowHistory));
        let mut session = Session::new();
        let inv = registry
            .execute(&call("retrieve_history", json!({})), &mut session, Duration::from_secs(2))
            .await
            .unwrap();
        assert!(!inv.success);
        assert!(inv.output.contains("timed out"));
        assert!(inv.output.contains("2000ms"));
    }

    #[tokio::test]
    async fn execute_unknown_tool_is_fatal() {
        let registry = ToolRegistry::new().with(Box::new(EchoRecipes));
        let mut session = Session::new();
        let err = registry
            .execute(&call("shell", json!({})), &mut session, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool { .. }));
    }
}
