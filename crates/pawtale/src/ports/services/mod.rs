//! Service Ports
//!
//! Abstract interfaces for external services.

mod llm_provider;
mod pims;
mod story_store;

pub use llm_provider::*;
pub use pims::*;
pub use story_store::*;
