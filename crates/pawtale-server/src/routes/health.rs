//! Liveness and feature-flag visibility

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheck {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub environment: String,
    pub services: ServiceFlags,
}

/// Which upstreams are configured
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceFlags {
    pub openai: bool,
    pub pims: bool,
    pub xano: bool,
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthCheck)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheck> {
    let config = &state.config;
    Json(HealthCheck {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.environment.as_str().to_string(),
        services: ServiceFlags {
            openai: !config.openai.api_key.is_empty(),
            pims: config.pims.configured,
            xano: config.persistence_enabled(),
        },
    })
}
