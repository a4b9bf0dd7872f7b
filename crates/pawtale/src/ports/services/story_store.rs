//! Story Store Port
//!
//! Best-effort persistence of generated stories.

use async_trait::async_trait;

use crate::domain::entities::XanoStoryPayload;
use crate::domain::errors::PersistenceError;

#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Whether a backend is configured at all. Check before saving:
    /// an unconfigured store is a normal state, not a failure.
    fn is_configured(&self) -> bool;

    /// Store a story and return the backend's record id
    async fn save_story(&self, payload: &XanoStoryPayload) -> Result<String, PersistenceError>;
}
