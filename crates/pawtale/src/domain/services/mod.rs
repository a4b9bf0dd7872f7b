//! Domain Services
//!
//! Pure functions over domain entities: no I/O, no clocks.

pub mod envelope;
pub mod prompt;
pub mod validation;

pub use envelope::{normalize_envelope, EnvelopeShape, ENVELOPE_SHAPES};
pub use prompt::{build_story_prompt, STORY_SYSTEM_PROMPT, STORY_SYSTEM_PROMPT_JSON};
pub use validation::validate_story_request;
