//! HTTP API gateway for ChefAI.
//!
//! Routes:
//! - `GET  /`                   welcome payload
//! - `GET  /api/health`         liveness
//! - `POST /api/ask`            answer one question
//! - `POST /api/recipes`        answer and keep the full run
//! - `GET  /api/recipes`        saved recipes, newest first
//! - `GET  /api/recipes/{id}`   one saved recipe
//!
//! Built on Axum. Every non-2xx response carries `{"detail": ...}`.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    http::{Method, header},
    response::Json,
    routing::get,
};
use chefai_agent::AgentLoop;
use chefai_core::history::{HistoryStore, SavedRecipeStore};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Collaborators shared by every request.
///
/// Nothing here is mutated per request: dietary restrictions live in the
/// per-request session, and the stores handle their own concurrency.
pub struct GatewayState {
    pub agent: Arc<AgentLoop>,
    pub history: Arc<dyn HistoryStore>,
    pub recipes: Arc<dyn SavedRecipeStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api::api_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the HTTP server and serve until the process is stopped.
pub async fn start(state: SharedState, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

async fn root_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Recipe Assistant API",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chefai_agent::test_helpers::SequentialMockProvider;
    use chefai_core::event::EventBus;
    use chefai_core::tool::ToolRegistry;
    use chefai_stores::{InMemoryHistoryStore, InMemorySavedRecipeStore};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        let agent = AgentLoop::new(
            Arc::new(SequentialMockProvider::new(vec![])),
            "mock-model",
            0.2,
            Arc::new(ToolRegistry::new()),
            Arc::new(EventBus::default()),
        );
        Arc::new(GatewayState {
            agent: Arc::new(agent),
            history: Arc::new(InMemoryHistoryStore::new()),
            recipes: Arc::new(InMemorySavedRecipeStore::new()),
        })
    }

    #[tokio::test]
    async fn root_welcomes() {
        let app = build_router(test_state());
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Welcome to the Recipe Assistant API");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = build_router(test_state());
        let req = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
