//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! the upstream ports.

mod pet_service;
mod story_service;

pub use pet_service::PetService;
pub use story_service::{StoryService, StorySettings};
