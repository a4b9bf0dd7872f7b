//! API error envelope
//!
//! Every failure leaves a handler as an `ApiError` and reaches the client as
//! `{error, message?, details?}` with a matching status code.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use pawtale::{FieldViolation, GenerationError, UpstreamError, ValidationError};

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            error: error.into(),
            message,
            details: None,
            retry_after: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error")]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("{error}: {message}")]
    BadRequest {
        error: &'static str,
        message: String,
    },

    #[error("{error}: {message}")]
    NotFound {
        error: &'static str,
        message: String,
    },

    #[error("Origin not allowed")]
    Cors,

    #[error("{error}")]
    RateLimited {
        error: &'static str,
        retry_after: Duration,
        window_hint: Option<String>,
    },

    #[error("{error}: {message}")]
    Upstream {
        error: &'static str,
        message: String,
        source: UpstreamError,
    },

    #[error("Story generation failed: {source}")]
    Generation {
        source: GenerationError,
        expose_details: bool,
    },
}

impl ApiError {
    pub fn generation(source: GenerationError, expose_details: bool) -> Self {
        Self::Generation {
            source,
            expose_details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidJson(_) | ApiError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Cors => StatusCode::FORBIDDEN,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Generation {
                source: GenerationError::ContentFlagged,
                ..
            } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Generation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::Validation(err) => ErrorBody {
                details: Some(err.violations),
                ..ErrorBody::new("Validation error", None)
            },
            ApiError::InvalidJson(message) => ErrorBody::new("Invalid JSON", Some(message)),
            ApiError::BadRequest { error, message } | ApiError::NotFound { error, message } => {
                ErrorBody::new(error, Some(message))
            }
            ApiError::Cors => ErrorBody::new("CORS error", Some("Origin not allowed".to_string())),
            ApiError::RateLimited {
                error, window_hint, ..
            } => ErrorBody {
                retry_after: window_hint,
                ..ErrorBody::new(error, Some("Please try again later".to_string()))
            },
            ApiError::Upstream { error, message, .. } => ErrorBody::new(error, Some(message)),
            ApiError::Generation {
                source: GenerationError::ContentFlagged,
                ..
            } => ErrorBody::new(
                "Content flagged",
                Some("The generated story did not pass content moderation".to_string()),
            ),
            ApiError::Generation {
                source,
                expose_details,
            } => ErrorBody::new(
                GenerationError::USER_MESSAGE,
                expose_details.then(|| source.to_string()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            ApiError::RateLimited { retry_after, .. } => Some(retry_after.as_secs().max(1)),
            _ => None,
        };

        let mut response = (status, Json(self.body())).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawtale::UpstreamErrorKind;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generation_detail_hidden_in_production() {
        let (status, body) = render(ApiError::generation(
            GenerationError::Provider("401 invalid api key".to_string()),
            false,
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate story. Please try again.");
        assert!(body.get("message").is_none());

        let (_, body) = render(ApiError::generation(GenerationError::EmptyContent, true)).await;
        assert_eq!(body["message"], "No story generated");
    }

    #[tokio::test]
    async fn test_upstream_is_bad_gateway() {
        let (status, body) = render(ApiError::Upstream {
            error: "Failed to fetch pets",
            message: "PIMS server error".to_string(),
            source: UpstreamError::new(UpstreamErrorKind::ServerError, "503 Service Unavailable"),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to fetch pets");
        assert_eq!(body["message"], "PIMS server error");
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            error: "Too many AI requests",
            retry_after: Duration::from_secs(90),
            window_hint: Some("15 minutes".to_string()),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "90");
    }
}
