//! Domain Errors
//!
//! Error types for domain operations. Each upstream collaborator has its own
//! error so callers can tell a fatal failure from a best-effort one.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Machine-readable classification of a single field violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// Required field absent or empty
    Required,
    /// Field present with the wrong JSON type
    InvalidType,
    /// Numeric field outside its allowed range
    TooSmall,
    /// String field not in its enumeration
    InvalidEnumValue,
}

/// One violated constraint on an inbound request
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Path to the offending field (empty for the body itself)
    pub path: Vec<String>,
    pub code: ViolationCode,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            path: if field.is_empty() {
                vec![]
            } else {
                vec![field.to_string()]
            },
            code,
            message: message.into(),
        }
    }

    /// Whether this violation points at the given top-level field
    pub fn is_for(&self, field: &str) -> bool {
        self.path.first().map(String::as_str) == Some(field)
    }
}

/// Client input failed validation; carries every violation found
#[derive(Debug, Clone, Error)]
#[error("Validation error: {} violation(s)", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.is_for(field))
    }
}

/// Cause of an upstream (PIMS) failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    ConnectionRefused,
    AuthenticationFailed,
    AccessDenied,
    NotFound,
    ServerError,
    Unknown,
}

impl UpstreamErrorKind {
    /// Classify an HTTP status returned by the upstream
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::AuthenticationFailed,
            403 => Self::AccessDenied,
            404 => Self::NotFound,
            s if s >= 500 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Message shown to API clients instead of the raw transport error
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConnectionRefused => "Unable to connect to PIMS server",
            Self::AuthenticationFailed => "PIMS authentication failed",
            Self::AccessDenied => "PIMS access denied",
            Self::NotFound => "PIMS endpoint not found",
            Self::ServerError => "PIMS server error",
            Self::Unknown => "Failed to fetch pets from PIMS",
        }
    }
}

/// Failure talking to the PIMS API
#[derive(Debug, Clone, Error)]
#[error("{}: {detail}", .kind.user_message())]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    /// Raw transport detail, for logs only
    pub detail: String,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

/// Failure producing a story
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("No story generated")]
    EmptyContent,

    #[error("Generated story was flagged by moderation")]
    ContentFlagged,
}

impl GenerationError {
    pub const USER_MESSAGE: &'static str = "Failed to generate story. Please try again.";
}

/// Failure storing a story; never fatal to story generation
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("Xano not configured")]
    NotConfigured,

    #[error("Failed to save story to Xano: {0}")]
    Request(String),

    #[error("Unexpected Xano response: {0}")]
    InvalidResponse(String),
}
