//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use pawtale::{
    FieldViolation, ModerationOutcome, PetInfo, StoryLength, StoryMetadata, StoryRequest,
    StoryResponse, ViolationCode,
};

use super::health::{HealthCheck, ServiceFlags};
use crate::error::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::health::health_check,
        super::pets::list_pets,
        super::pets::get_pet,
        super::story::generate_story,
    ),
    info(
        title = "Pawtale API",
        version = "0.1.0",
        description = "Personalized pet stories from an LLM, with pet records proxied from the practice management system.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Pets", description = "Pets - PIMS record proxy"),
        (name = "Story", description = "Story - LLM story generation"),
    ),
    components(
        schemas(
            // Health
            HealthCheck,
            ServiceFlags,
            // Story
            StoryRequest,
            StoryLength,
            StoryResponse,
            StoryMetadata,
            PetInfo,
            ModerationOutcome,
            // Errors
            ErrorBody,
            FieldViolation,
            ViolationCode,
        )
    )
)]
pub struct ApiDoc;
