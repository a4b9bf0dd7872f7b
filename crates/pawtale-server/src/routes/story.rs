//! Story Routes - LLM story generation

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde_json::Value;

use pawtale::domain::services::validate_story_request;
use pawtale::{StoryRequest, StoryResponse};

use crate::error::{ApiError, ErrorBody};
use crate::AppState;

/// Generate a story about a pet
#[utoipa::path(
    post,
    path = "/api/generate-story",
    request_body = StoryRequest,
    responses(
        (status = 200, description = "Story generated", body = StoryResponse),
        (status = 400, description = "Malformed JSON or failed validation", body = ErrorBody),
        (status = 422, description = "Story refused by content moderation", body = ErrorBody),
        (status = 429, description = "Generation budget spent", body = ErrorBody),
        (status = 500, description = "Story generation failed", body = ErrorBody)
    ),
    tag = "Story"
)]
pub async fn generate_story(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StoryResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::InvalidJson(rejection.body_text()))?;

    let request = validate_story_request(&body).map_err(|err| {
        tracing::debug!(violations = err.violations.len(), "Rejected story request");
        err
    })?;

    tracing::info!(
        pet = %request.pet_name,
        length = %request.length(),
        theme = request.theme(),
        "Generating story"
    );

    let response = state.story_service.generate(&request).await.map_err(|err| {
        tracing::error!("Story generation error: {}", err);
        ApiError::generation(err, state.config.expose_error_details())
    })?;

    Ok(Json(response))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate-story", post(generate_story))
}
