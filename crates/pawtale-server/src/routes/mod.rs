//! Pawtale API Routes
//!
//! - /api/health - liveness and configured upstreams
//! - /api/pets - PIMS pet list
//! - /api/pets/:id - single PIMS pet (with list-scan fallback)
//! - /api/generate-story - LLM story generation (own rate limit)
//! - /swagger-ui, /api-docs/openapi.json - OpenAPI documentation

pub mod health;
pub mod pets;
pub mod story;
pub mod swagger;

use axum::{
    extract::DefaultBodyLimit,
    http::{Method, Uri},
    middleware,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::middleware::{cors_guard, enforce_rate_limit, with_security_headers};
use crate::AppState;

const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Assemble every route and middleware over `state`
pub fn build_router(state: AppState) -> Router {
    let openapi = swagger::ApiDoc::openapi();

    let generation = story::router().route_layer(middleware::from_fn_with_state(
        state.generation_limit.clone(),
        enforce_rate_limit,
    ));

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/api/health", get(health::health_check))
        .merge(pets::router())
        .merge(generation)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware::from_fn_with_state(
            state.general_limit.clone(),
            enforce_rate_limit,
        ))
        .layer(state.cors.layer())
        .layer(middleware::from_fn_with_state(state.cors.clone(), cors_guard))
        .with_state(state.clone());

    let router = with_security_headers(router);

    if state.config.is_production() {
        router
    } else {
        router.layer(TraceLayer::new_for_http())
    }
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound {
        error: "Endpoint not found",
        message: format!("{} {} is not a valid endpoint", method, uri),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_config, test_state, words, FakeLlm, FakePims, FakeStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use axum::response::Response;
    use pawtale::UpstreamErrorKind;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BODY_READ_LIMIT: usize = 1_048_576;

    fn app(llm: FakeLlm, pims: FakePims) -> Router {
        build_router(test_state(
            test_config(&[]),
            llm,
            pims,
            FakeStore::unconfigured(),
        ))
    }

    fn story_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/generate-story")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response: Response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), BODY_READ_LIMIT).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_generate_story_end_to_end() {
        let app = app(FakeLlm::replying(words(120)), FakePims::listing(json!([])));
        let body = json!({"petName": "Rex", "petType": "dog", "ownerName": "Alice"});

        let (status, headers, body) = send(app, story_request(body.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["wordCount"], 120);
        assert_eq!(body["metadata"]["theme"], "adventure");
        assert_eq!(body["metadata"]["petInfo"]["name"], "Rex");
        assert_eq!(body["metadata"]["petInfo"]["type"], "dog");
        assert!(body["metadata"]["generatedAt"].is_string());
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[tokio::test]
    async fn test_generate_story_validation_lists_every_field() {
        let app = app(FakeLlm::replying("unused"), FakePims::listing(json!([])));
        let body = json!({"petName": "Rex", "petAge": -1, "storyLength": "epic"});

        let (status, _, body) = send(app, story_request(body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation error");

        let paths: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["path"][0].as_str().unwrap())
            .collect();
        for field in ["petType", "ownerName", "petAge", "storyLength"] {
            assert!(paths.contains(&field), "missing {field} in {paths:?}");
        }
    }

    #[tokio::test]
    async fn test_generate_story_rejects_malformed_json() {
        let app = app(FakeLlm::replying("unused"), FakePims::listing(json!([])));

        let (status, _, body) = send(app, story_request("{\"petName\": ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON");
    }

    #[tokio::test]
    async fn test_generation_failure_shows_detail_outside_production() {
        let app = app(FakeLlm::failing(), FakePims::listing(json!([])));
        let body = json!({"petName": "Rex", "petType": "dog", "ownerName": "Alice"});

        let (status, _, body) = send(app, story_request(body.to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate story. Please try again.");
        assert!(body["message"].as_str().unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_unknown_pet_is_not_found() {
        let app = app(FakeLlm::replying("unused"), FakePims::listing(json!([])));

        let (status, _, body) = send(app, get("/api/pets/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Pet not found", "message": "Pet with ID 999 not found"})
        );
    }

    #[tokio::test]
    async fn test_pet_found_by_fallback_scan() {
        let pims = FakePims::listing(json!({"patients": [{"id": 42, "name": "Rex"}]}));
        let (status, _, body) = send(app(FakeLlm::replying("unused"), pims), get("/api/pets/42")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Rex");
    }

    #[tokio::test]
    async fn test_missing_pet_id() {
        let app = app(FakeLlm::replying("unused"), FakePims::listing(json!([])));

        let (status, _, body) = send(app, get("/api/pets/")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Pet ID required");
    }

    #[tokio::test]
    async fn test_pet_list_upstream_failures_are_labelled() {
        let cases = [
            (UpstreamErrorKind::ConnectionRefused, "Cannot connect to veterinary system", "Unable to connect to PIMS server"),
            (UpstreamErrorKind::AuthenticationFailed, "Authentication failed with veterinary system", "PIMS authentication failed"),
            (UpstreamErrorKind::ServerError, "Failed to fetch pets", "PIMS server error"),
        ];
        for (kind, error, message) in cases {
            let app = app(FakeLlm::replying("unused"), FakePims::failing(kind));
            let (status, _, body) = send(app, get("/api/pets")).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(body, json!({"error": error, "message": message}));
        }
    }

    #[tokio::test]
    async fn test_pet_list_ok() {
        let pims = FakePims::listing(json!({"items": [{"id": "a1", "name": "Luna"}]}));
        let (status, _, body) = send(app(FakeLlm::replying("unused"), pims), get("/api/pets")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": "a1", "name": "Luna"}]));
    }

    #[tokio::test]
    async fn test_health_reports_configured_upstreams() {
        let config = test_config(&[("XANO_BASE_URL", "https://x.xano.io/api:abc")]);
        let app = build_router(test_state(
            config,
            FakeLlm::replying("unused"),
            FakePims::listing(json!([])),
            FakeStore::unconfigured(),
        ));

        let (status, _, body) = send(app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "test");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["services"], json!({"openai": true, "pims": false, "xano": true}));
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let app = app(FakeLlm::replying("unused"), FakePims::listing(json!([])));

        let (status, _, body) = send(app, get("/api/nope?x=1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Endpoint not found", "message": "GET /api/nope?x=1 is not a valid endpoint"})
        );
    }

    #[tokio::test]
    async fn test_foreign_origin_is_forbidden() {
        let app = app(FakeLlm::replying("unused"), FakePims::listing(json!([])));
        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();

        let (status, _, body) = send(app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"error": "CORS error", "message": "Origin not allowed"}));
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let app = app(FakeLlm::replying("unused"), FakePims::listing(json!([])));
        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://localhost:5173/")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173/");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_generation_budget_is_enforced() {
        let state = test_state(
            test_config(&[("MAX_REQUESTS_PER_WINDOW", "1")]),
            FakeLlm::replying("Rex ran."),
            FakePims::listing(json!([])),
            FakeStore::unconfigured(),
        );
        let app = build_router(state);
        let body = json!({"petName": "Rex", "petType": "dog", "ownerName": "Alice"}).to_string();

        let (status, _, _) = send(app.clone(), story_request(body.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, headers, body) = send(app.clone(), story_request(body)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body,
            json!({
                "error": "Too many AI requests",
                "message": "Please try again later",
                "retryAfter": "15 minutes"
            })
        );
        assert!(headers.contains_key(header::RETRY_AFTER));

        // health is outside the generation budget
        let (status, _, _) = send(app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
