//! Pet Routes - PIMS proxy
//!
//! Thin handlers over `PetService`; upstream failures become 502s with a
//! label that says which way the veterinary system failed.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use pawtale::{PimsPet, UpstreamError, UpstreamErrorKind};

use crate::error::{ApiError, ErrorBody};
use crate::AppState;

/// List all pets
#[utoipa::path(
    get,
    path = "/api/pets",
    responses(
        (status = 200, description = "Pet records as stored in PIMS (open-ended objects)"),
        (status = 502, description = "PIMS unreachable or failing", body = ErrorBody)
    ),
    tag = "Pets"
)]
pub async fn list_pets(State(state): State<AppState>) -> Result<Json<Vec<PimsPet>>, ApiError> {
    tracing::info!("Fetching all pets from PIMS...");

    let pets = state.pet_service.list_pets().await.map_err(|err| {
        tracing::error!("Get pets error: {}", err);
        list_error(err)
    })?;

    tracing::info!("Successfully fetched {} pets from PIMS", pets.len());
    Ok(Json(pets))
}

/// Get a pet by ID
#[utoipa::path(
    get,
    path = "/api/pets/{id}",
    params(
        ("id" = String, Path, description = "PIMS pet ID (string or numeric)")
    ),
    responses(
        (status = 200, description = "Pet record as stored in PIMS"),
        (status = 400, description = "Missing pet ID", body = ErrorBody),
        (status = 404, description = "Pet not found", body = ErrorBody),
        (status = 502, description = "PIMS unreachable or failing", body = ErrorBody)
    ),
    tag = "Pets"
)]
pub async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PimsPet>, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(missing_id());
    }

    tracing::info!("Fetching pet {} from PIMS...", id);

    match state.pet_service.get_pet(id).await {
        Ok(Some(pet)) => {
            tracing::info!("Successfully fetched pet {} from PIMS", id);
            Ok(Json(pet))
        }
        Ok(None) => Err(ApiError::NotFound {
            error: "Pet not found",
            message: format!("Pet with ID {} not found", id),
        }),
        Err(err) => {
            tracing::error!("Get pet {} error: {}", id, err);
            Err(ApiError::Upstream {
                error: "Failed to fetch pet",
                message: format!("Failed to fetch pet {} from PIMS", id),
                source: err,
            })
        }
    }
}

async fn missing_pet_id() -> ApiError {
    missing_id()
}

fn missing_id() -> ApiError {
    ApiError::BadRequest {
        error: "Pet ID required",
        message: "Please provide a valid pet ID".to_string(),
    }
}

fn list_error(err: UpstreamError) -> ApiError {
    let error = match err.kind {
        UpstreamErrorKind::ConnectionRefused => "Cannot connect to veterinary system",
        UpstreamErrorKind::AuthenticationFailed => "Authentication failed with veterinary system",
        _ => "Failed to fetch pets",
    };
    ApiError::Upstream {
        error,
        message: err.user_message().to_string(),
        source: err,
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pets", get(list_pets))
        .route("/api/pets/", get(missing_pet_id))
        .route("/api/pets/:id", get(get_pet))
}
