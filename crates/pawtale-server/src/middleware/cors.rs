//! Origin allow-list
//!
//! Browsers get the usual CORS headers from `CorsLayer`; requests from
//! origins outside the list are refused outright with a 403 envelope.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, request::Parts, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;
use crate::error::ApiError;

/// Dev servers that are always allowed next to `FRONTEND_URL`
const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:5173"];

/// Private network ranges on the frontend dev port
const PRIVATE_NETWORK_ORIGIN: &str =
    r"^https?://(192\.168\.\d+\.\d+|10\.\d+\.\d+\.\d+|172\.(1[6-9]|2\d|3[01])\.\d+\.\d+):5173/?$";

#[derive(Debug)]
pub struct CorsPolicy {
    allowed: Vec<String>,
    private_network: Option<Regex>,
}

impl CorsPolicy {
    /// Build the allow-list; the private-network pattern only applies
    /// outside production.
    pub fn new(config: &CorsConfig, production: bool) -> Result<Self, regex::Error> {
        let mut allowed: Vec<String> = std::iter::once(config.frontend_url.as_str())
            .chain(DEV_ORIGINS)
            .chain(config.extra_origins.iter().map(String::as_str))
            .map(|origin| normalize(origin).to_string())
            .collect();
        allowed.sort();
        allowed.dedup();

        let private_network = if production {
            None
        } else {
            Some(Regex::new(PRIVATE_NETWORK_ORIGIN)?)
        };

        Ok(Self {
            allowed,
            private_network,
        })
    }

    pub fn allows(&self, origin: &str) -> bool {
        let origin = normalize(origin);
        if self.allowed.iter().any(|allowed| allowed == origin) {
            return true;
        }
        self.private_network
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(origin))
    }

    /// Response-header side of the policy
    pub fn layer(self: &Arc<Self>) -> CorsLayer {
        let policy = Arc::clone(self);
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    origin.to_str().is_ok_and(|origin| policy.allows(origin))
                },
            ))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                HeaderName::from_static("x-requested-with"),
            ])
    }
}

fn normalize(origin: &str) -> &str {
    origin.strip_suffix('/').unwrap_or(origin)
}

/// Refuse requests from origins outside the allow-list.
/// Requests without an `Origin` header (curl, server-to-server) pass.
pub async fn cors_guard(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|value| value.to_str().unwrap_or_default().to_string());

    match origin {
        Some(origin) if !policy.allows(&origin) => {
            tracing::warn!(%origin, "CORS: Rejecting origin");
            ApiError::Cors.into_response()
        }
        _ => next.run(request).await,
    }
}
