//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod moderation_mode;
mod story_length;

pub use moderation_mode::*;
pub use story_length::*;
