//! `/api` routes: ask, health, saved recipes.

use crate::SharedState;
use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chefai_agent::AgentRun;
use chefai_core::dietary::DietaryRestrictionSet;
use chefai_core::error::{AgentError, Error, ProviderError};
use chefai_core::history::{HistoryRecord, SavedRecipe};
use chefai_core::session::Session;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ask", post(ask_handler))
        .route("/recipes", post(save_recipe_handler).get(list_recipes_handler))
        .route("/recipes/{id}", get(get_recipe_handler))
}

// --- DTOs ---

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Free-form tokens; anything outside the vocabulary is dropped.
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// A failed request: status plus a message safe for end users.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        error!(error = %e, "Request failed");
        let status = match &e {
            Error::Agent(AgentError::Timeout { .. }) | Error::Provider(ProviderError::Timeout(_)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.user_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}

// --- Handlers ---

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ask_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload?;
    let run = answer(&state, request).await?;
    Ok(Json(AskResponse { answer: run.answer }))
}

async fn save_recipe_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedRecipe>), ApiError> {
    let Json(request) = payload?;
    let question = request.question.clone();
    let run = answer(&state, request).await?;

    let recipe = SavedRecipe::new(question, run.answer, run.invocations);
    state
        .recipes
        .save(recipe.clone())
        .await
        .map_err(|e| ApiError::from(Error::from(e)))?;

    info!(recipe_id = %recipe.recipe_id, "Recipe saved");
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn list_recipes_handler(State(state): State<SharedState>) -> Result<Json<Vec<SavedRecipe>>, ApiError> {
    let recipes = state
        .recipes
        .list()
        .await
        .map_err(|e| ApiError::from(Error::from(e)))?;
    Ok(Json(recipes))
}

async fn get_recipe_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SavedRecipe>, ApiError> {
    state
        .recipes
        .get(&id)
        .await
        .map_err(|e| ApiError::from(Error::from(e)))?
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Recipe {id} not found")))
}

/// Record the question, then run the agent in a fresh session.
///
/// A history write failure fails the request before the agent starts.
async fn answer(state: &SharedState, request: AskRequest) -> Result<AgentRun, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Question must not be empty",
        ));
    }

    state
        .history
        .append(HistoryRecord::new(question))
        .await
        .map_err(|e| ApiError::from(Error::from(e)))?;

    let mut session =
        Session::with_restrictions(DietaryRestrictionSet::from_tokens(&request.dietary_restrictions));
    info!(
        session = %session.id,
        restrictions = %session.restrictions(),
        "Question received"
    );

    Ok(state.agent.run(question, &mut session).await?)
}
