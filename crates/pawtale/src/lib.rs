//! Pawtale Domain Library
//!
//! Core domain types and interfaces for the pet-story service.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Story request/response, PIMS pets, saved-story payloads
//!   - `value_objects/`: Immutable value types (StoryLength, ModerationMode)
//!   - `services/`: Validation, prompt rendering, envelope normalization
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits) for the upstream APIs
//!
//! # Usage
//!
//! ```rust,ignore
//! use pawtale::domain::services::{build_story_prompt, validate_story_request};
//! use pawtale::ports::{PimsGateway, StoryLlm, StoryStore};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    count_words, FieldViolation, GenerationError, ModerationMode, ModerationOutcome, PersistenceError,
    PetId, PetInfo, PimsPet, StoryDraft, StoryLength, StoryMetadata, StoryRequest, StoryResponse,
    UpstreamError, UpstreamErrorKind, ValidationError, ViolationCode, XanoStoryPayload,
    DEFAULT_THEME,
};
pub use ports::{
    ChatMessage, CompletionOptions, CompletionResponse, MessageRole, ModerationVerdict,
    PimsGateway, StoryLlm, StoryStore, TokenUsage,
};
