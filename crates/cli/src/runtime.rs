//! Startup wiring: every external client is built here, once, from config
//! and handed to the agent and the gateway.

use chefai_agent::{AgentLoop, PromptAssembler};
use chefai_config::{AppConfig, RetrievalBackend};
use chefai_core::event::{DomainEvent, EventBus};
use chefai_core::history::{HistoryStore, SavedRecipeStore};
use chefai_core::retrieval::RetrievalService;
use chefai_core::web::WebSearchService;
use chefai_providers::ProviderSet;
use chefai_stores::{InMemoryHistoryStore, InMemoryRetriever, InMemorySavedRecipeStore, QdrantRetriever, SqliteStore};
use chefai_tools::{TavilyClient, ToolServices};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Indexed when retrieval runs in-process instead of against Qdrant.
const STARTER_RECIPES: [(&str, &str, &str); 5] = [
    (
        "Spaghetti Carbonara",
        "spaghetti, eggs, pancetta, Pecorino Romano cheese, black pepper",
        "Cook pasta. Fry pancetta. Mix eggs and cheese. Combine all ingredients.",
    ),
    (
        "Chicken Stir Fry",
        "chicken breast, mixed vegetables, soy sauce, garlic, ginger",
        "Cut chicken. Stir-fry with vegetables. Add sauce and seasonings.",
    ),
    (
        "Vegetable Soup",
        "carrots, celery, onions, potatoes, vegetable broth, herbs",
        "Chop vegetables. Simmer in broth. Add herbs and season to taste.",
    ),
    (
        "Chocolate Chip Cookies",
        "flour, butter, sugar, eggs, chocolate chips, vanilla extract",
        "Mix ingredients. Form dough balls. Bake until golden brown.",
    ),
    (
        "Greek Salad",
        "tomatoes, cucumbers, red onion, feta cheese, olives, olive oil",
        "Chop vegetables. Combine in bowl. Add cheese and olives. Dress with olive oil.",
    ),
];

pub struct Runtime {
    pub config: AppConfig,
    pub agent: Arc<AgentLoop>,
    pub history: Arc<dyn HistoryStore>,
    pub recipes: Arc<dyn SavedRecipeStore>,
    pub event_bus: Arc<EventBus>,
}

impl Runtime {
    /// Load config and build everything an agent run needs.
    pub async fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
        Self::build(config).await
    }

    pub async fn build(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if !config.has_api_key() {
            warn!("No language model API key configured; requests will fail until one is set");
        }

        let providers = chefai_providers::build_from_config(&config)?;
        debug!(?providers, "Providers ready");

        let (history, recipes) = open_stores(&config).await?;
        let retriever = build_retriever(&config, &providers).await;
        let web = build_web_search(&config);

        let tools = chefai_tools::default_registry(ToolServices {
            retriever,
            web,
            history: history.clone(),
            top_k: config.retrieval.top_k,
            web_results: config.web_search.max_results,
            history_limit: config.history.limit,
        });
        info!(tools = ?tools.names(), "Tool registry built");

        let mut prompt = PromptAssembler::new();
        if let Some(persona) = &config.agent.persona_override {
            prompt = prompt.with_persona(persona.clone());
        }

        let event_bus = Arc::new(EventBus::default());
        let mut agent = AgentLoop::new(
            providers.chat,
            providers.chat_model,
            config.llm.temperature,
            Arc::new(tools),
            event_bus.clone(),
        )
        .with_prompt(prompt)
        .with_max_steps(config.agent.max_steps)
        .with_llm_timeout(config.agent.llm_timeout())
        .with_tool_timeout(config.agent.tool_timeout())
        .with_request_timeout(config.agent.request_timeout());
        if let Some(max_tokens) = config.llm.max_tokens {
            agent = agent.with_max_tokens(max_tokens);
        }

        Ok(Self {
            config,
            agent: Arc::new(agent),
            history,
            recipes,
            event_bus,
        })
    }

    /// Log domain events at debug level until the bus closes.
    pub fn spawn_event_logger(&self) {
        let mut rx = self.event_bus.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                match event.as_ref() {
                    DomainEvent::ToolExecuted {
                        conversation_id,
                        tool_name,
                        success,
                        duration_ms,
                        ..
                    } => debug!(%conversation_id, %tool_name, success, duration_ms, "event: tool executed"),
                    DomainEvent::ResponseGenerated {
                        conversation_id,
                        steps,
                        tokens_used,
                        ..
                    } => debug!(%conversation_id, steps, ?tokens_used, "event: response generated"),
                    other => debug!(event = ?other, "event"),
                }
            }
        });
    }
}

async fn open_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn HistoryStore>, Arc<dyn SavedRecipeStore>), Box<dyn std::error::Error>> {
    let url = config.history.database_url.as_str();
    if url == "memory" {
        info!("Using in-memory history; questions are lost on exit");
        return Ok((
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(InMemorySavedRecipeStore::new()),
        ));
    }

    std::fs::create_dir_all(AppConfig::config_dir())?;
    let store = SqliteStore::new(url).await?;
    Ok((Arc::new(store.clone()), Arc::new(store)))
}

async fn build_retriever(config: &AppConfig, providers: &ProviderSet) -> Arc<dyn RetrievalService> {
    match config.retrieval.backend {
        RetrievalBackend::Qdrant => {
            info!(
                url = %config.retrieval.qdrant_url(),
                collection = %config.retrieval.collection,
                "Using Qdrant retriever"
            );
            Arc::new(QdrantRetriever::new(
                config.retrieval.qdrant_url(),
                config.retrieval.collection.clone(),
                providers.embeddings.clone(),
                providers.embedding_model.clone(),
            ))
        }
        RetrievalBackend::InMemory => {
            let retriever = InMemoryRetriever::new(providers.embeddings.clone(), providers.embedding_model.clone());
            let documents = STARTER_RECIPES
                .iter()
                .map(|(name, ingredients, instructions)| {
                    (format!("{name} {ingredients} {instructions}"), (*name).to_string())
                })
                .collect();
            match retriever.add_documents(documents).await {
                Ok(count) => info!(count, "Indexed starter recipes in memory"),
                Err(e) => warn!(error = %e, "Could not index starter recipes; recipe search will return nothing"),
            }
            Arc::new(retriever)
        }
    }
}

fn build_web_search(config: &AppConfig) -> Option<Arc<dyn WebSearchService>> {
    if !config.web_search.enabled {
        info!("Web search disabled");
        return None;
    }
    let api_key = config.web_search.api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        warn!("TAVILY_API_KEY is not set; web_search calls will report an error");
    }
    Some(Arc::new(TavilyClient::new(api_key)))
}
