//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Story: inbound generation request and the shaped response
//! - StoryDraft: content extracted from a completion
//! - Pet: a PIMS patient record, open-ended
//! - SavedStory: payload persisted to the low-code backend

mod draft;
mod pet;
mod saved_story;
mod story;

pub use draft::*;
pub use pet::*;
pub use saved_story::*;
pub use story::*;
