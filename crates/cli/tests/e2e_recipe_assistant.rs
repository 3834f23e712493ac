//! End-to-end tests for the recipe assistant.
//!
//! These wire the real tools, stores and agent loop together; only the
//! language model and the embedding model are scripted.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chefai_agent::AgentLoop;
use chefai_agent::test_helpers::{
    SequentialMockProvider, make_text_response, make_tool_call, make_tool_call_response,
};
use chefai_core::dietary::{DietaryRestriction, DietaryRestrictionSet};
use chefai_core::error::ProviderError;
use chefai_core::event::EventBus;
use chefai_core::history::{HistoryRecord, HistoryStore};
use chefai_core::message::Role;
use chefai_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
};
use chefai_core::session::Session;
use chefai_core::tool::ToolKind;
use chefai_core::web::WebSearchService;
use chefai_gateway::{GatewayState, build_router};
use chefai_stores::{InMemoryHistoryStore, InMemoryRetriever, InMemorySavedRecipeStore};
use chefai_tools::{TavilyClient, ToolServices, default_registry};
use http_body_util::BodyExt;
use tower::ServiceExt;

// ── Scripted embeddings ──────────────────────────────────────────────────

/// Embeds text as keyword counts over a small cooking vocabulary.
struct KeywordEmbedder;

const VOCAB: [&str; 6] = ["chocolate", "cake", "brownie", "soup", "salad", "vegan"];

#[async_trait::async_trait]
impl Provider for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured("embeddings only".into()))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let embeddings = request
            .inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                VOCAB.iter().map(|w| lower.matches(w).count() as f32).collect()
            })
            .collect();
        Ok(EmbeddingResponse {
            embeddings,
            model: request.model,
            usage: None,
        })
    }
}

// ── Fixture ──────────────────────────────────────────────────────────────

struct Kitchen {
    provider: Arc<SequentialMockProvider>,
    history: Arc<InMemoryHistoryStore>,
    agent: Arc<AgentLoop>,
}

async fn kitchen(responses: Vec<ProviderResponse>) -> Kitchen {
    let retriever = InMemoryRetriever::new(Arc::new(KeywordEmbedder), "keyword");
    retriever
        .add_documents(vec![
            (
                "Chocolate cake: 200g flour, 50g cocoa, 200g sugar, 3 eggs, 100g butter. Bake 35 minutes at 180C.".into(),
                "chocolate_cake.txt".into(),
            ),
            (
                "Vegan brownie: almond flour, cocoa, maple syrup, coconut oil, flax seeds. Bake 25 minutes.".into(),
                "vegan_brownie.txt".into(),
            ),
            ("Tomato soup with basil and garlic.".into(), "soup.txt".into()),
            ("Greek salad with feta and olives.".into(), "salad.txt".into()),
        ])
        .await
        .unwrap();

    // Nothing listens on the discard port, so every web search fails in transport.
    let web: Arc<dyn WebSearchService> =
        Arc::new(TavilyClient::with_base_url("http://127.0.0.1:9", "tvly-test"));

    let history = Arc::new(InMemoryHistoryStore::new());
    let tools = default_registry(ToolServices {
        retriever: Arc::new(retriever),
        web: Some(web),
        history: history.clone(),
        top_k: 4,
        web_results: 3,
        history_limit: 5,
    });

    let provider = Arc::new(SequentialMockProvider::new(responses));
    let agent = AgentLoop::new(
        provider.clone(),
        "mock-model",
        0.2,
        Arc::new(tools),
        Arc::new(EventBus::default()),
    );

    Kitchen {
        provider,
        history,
        agent: Arc::new(agent),
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn chocolate_cake_question_uses_recipe_search() {
    let k = kitchen(vec![
        make_tool_call_response(
            vec![make_tool_call("recipe_search", r#"{"query": "chocolate cake"}"#)],
            "",
        ),
        make_text_response(
            "Mix 200g flour, 50g cocoa, 200g sugar, 3 eggs and 100g butter, then bake for 35 minutes at 180C.",
        ),
    ])
    .await;

    let mut session = Session::new();
    let run = k
        .agent
        .run("How do I make a chocolate cake?", &mut session)
        .await
        .unwrap();

    assert!(run.answer.contains("cocoa"));
    assert_eq!(run.invocations.len(), 1);
    let search = &run.invocations[0];
    assert_eq!(search.tool, ToolKind::RecipeSearch);
    assert!(search.success);
    assert!(search.output.starts_with("Source: chocolate_cake.txt"));

    // The observation reached the model on the second step.
    let second = &k.provider.requests()[1];
    let observation = second.messages.last().unwrap();
    assert_eq!(observation.role, Role::Tool);
    assert!(observation.content.contains("Bake 35 minutes"));
}

#[tokio::test]
async fn vegan_gluten_free_dessert_avoids_banned_ingredients() {
    let answer = "Try vegan gluten-free brownies: whisk almond flour, cocoa, maple syrup, melted \
                  coconut oil and ground flax seeds, then bake for 25 minutes.";
    let k = kitchen(vec![
        make_tool_call_response(
            vec![make_tool_call("recipe_search", r#"{"query": "vegan gluten-free dessert"}"#)],
            "",
        ),
        make_text_response(answer),
    ])
    .await;

    let restrictions: DietaryRestrictionSet =
        [DietaryRestriction::Vegan, DietaryRestriction::GlutenFree]
            .into_iter()
            .collect();
    let mut session = Session::with_restrictions(restrictions);
    let run = k
        .agent
        .run("Suggest a dessert I can make tonight", &mut session)
        .await
        .unwrap();

    // Every step told the model about both restrictions.
    for request in k.provider.requests() {
        let clause = request
            .messages
            .iter()
            .find(|m| m.role == Role::System && m.content.starts_with("IMPORTANT"))
            .unwrap();
        assert!(clause.content.contains("vegan, gluten-free"));
    }

    let lower = run.answer.to_lowercase();
    for banned in ["butter", "egg", "milk", "cream", "honey", "wheat flour", "all-purpose flour"] {
        assert!(!lower.contains(banned), "answer mentions banned ingredient {banned}");
    }
}

#[tokio::test]
async fn web_search_transport_failure_still_yields_answer() {
    let k = kitchen(vec![
        make_tool_call_response(
            vec![make_tool_call("web_search", r#"{"query": "seasonal autumn recipes"}"#)],
            "",
        ),
        make_text_response("Roast squash with sage is a great autumn dish."),
    ])
    .await;

    let run = k
        .agent
        .run("What is in season this autumn?", &mut Session::new())
        .await
        .unwrap();

    assert_eq!(run.answer, "Roast squash with sage is a great autumn dish.");
    assert!(!run.invocations[0].success);
    assert!(run.invocations[0]
        .output
        .starts_with("An error occurred during the web search:"));
}

#[tokio::test]
async fn history_tool_reports_newest_first_and_bounded() {
    let k = kitchen(vec![
        make_tool_call_response(vec![make_tool_call("retrieve_history", "{}")], ""),
        make_text_response("Based on your searches, try a mushroom risotto."),
    ])
    .await;

    for i in 1..=7 {
        k.history
            .append(HistoryRecord::new(format!("question {i}")))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let run = k.agent.run("Propose a recipe", &mut Session::new()).await.unwrap();
    let output = &run.invocations[0].output;

    assert!(output.starts_with("Recent searches (newest first):"));
    assert!(output.contains("question 7"));
    assert!(output.contains("question 3"));
    assert!(!output.contains("question 2"));
    assert!(output.find("question 7").unwrap() < output.find("question 3").unwrap());
}

#[tokio::test]
async fn restriction_update_mid_run_replaces_session_set() {
    let k = kitchen(vec![
        make_tool_call_response(
            vec![make_tool_call(
                "set_dietary_restrictions",
                r#"{"restrictions": "vegan, made-up-diet, kosher"}"#,
            )],
            "",
        ),
        make_text_response("Got it, vegan and kosher from now on."),
    ])
    .await;

    let mut session = Session::with_restrictions(DietaryRestrictionSet::parse_list("halal"));
    let run = k
        .agent
        .run("I'm vegan and keep kosher", &mut session)
        .await
        .unwrap();

    assert_eq!(
        run.invocations[0].output,
        "Successfully set dietary restrictions: vegan, kosher"
    );
    assert_eq!(session.restrictions(), &DietaryRestrictionSet::parse_list("kosher, vegan"));
    assert!(!session.restrictions().contains(DietaryRestriction::Halal));
}

#[tokio::test]
async fn http_ask_records_history_and_answers() {
    let k = kitchen(vec![make_text_response("Greek salad: tomatoes, cucumber, feta, olives.")]).await;
    let state = Arc::new(GatewayState {
        agent: k.agent.clone(),
        history: k.history.clone(),
        recipes: Arc::new(InMemorySavedRecipeStore::new()),
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/ask")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "question": "A quick salad?",
                "dietary_restrictions": ["vegetarian"]
            })
            .to_string(),
        ))
        .unwrap();

    let response = build_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["answer"], "Greek salad: tomatoes, cucumber, feta, olives.");

    let recent = k.history.recent(5).await.unwrap();
    assert_eq!(recent[0].question, "A quick salad?");
}
