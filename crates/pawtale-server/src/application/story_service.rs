//! Story Application Service (Use Case)
//!
//! prompt -> completion -> response shaping, then the optional
//! moderation and persistence steps. Only the completion is fatal.

use std::sync::Arc;

use chrono::Utc;

use pawtale::domain::services::{build_story_prompt, STORY_SYSTEM_PROMPT, STORY_SYSTEM_PROMPT_JSON};
use pawtale::{
    ChatMessage, CompletionOptions, GenerationError, ModerationMode, ModerationOutcome,
    StoryDraft, StoryLlm, StoryRequest, StoryResponse, StoryStore, XanoStoryPayload,
};

const TEMPERATURE: f32 = 0.8;

/// Knobs for story generation
#[derive(Debug, Clone, Copy, Default)]
pub struct StorySettings {
    pub json_mode: bool,
    pub moderation_default: bool,
    pub moderation_mode: ModerationMode,
}

pub struct StoryService {
    llm: Arc<dyn StoryLlm>,
    store: Arc<dyn StoryStore>,
    settings: StorySettings,
}

impl StoryService {
    pub fn new(llm: Arc<dyn StoryLlm>, store: Arc<dyn StoryStore>, settings: StorySettings) -> Self {
        Self {
            llm,
            store,
            settings,
        }
    }

    /// Generate a story for a validated request
    pub async fn generate(&self, request: &StoryRequest) -> Result<StoryResponse, GenerationError> {
        let draft = self.draft(request).await?;

        let mut response = StoryResponse::assemble(request, draft.story.clone(), Utc::now());

        if request
            .moderation_check
            .unwrap_or(self.settings.moderation_default)
        {
            let outcome = self.moderate(&response.story).await;
            if outcome.flagged && self.settings.moderation_mode == ModerationMode::Reject {
                return Err(GenerationError::ContentFlagged);
            }
            response.metadata.moderation = Some(outcome);
        }

        if let Some(pet_id) = &request.pims_pet_id {
            response.metadata.saved_story_id = self.persist(pet_id, request, &draft).await;
        }

        tracing::info!(
            pet = %request.pet_name,
            words = response.metadata.word_count,
            model = self.llm.model_id(),
            "Story generated"
        );

        Ok(response)
    }

    async fn draft(&self, request: &StoryRequest) -> Result<StoryDraft, GenerationError> {
        let json_mode = self.settings.json_mode;
        let system = if json_mode {
            STORY_SYSTEM_PROMPT_JSON
        } else {
            STORY_SYSTEM_PROMPT
        };
        let messages = [
            ChatMessage::system(system),
            ChatMessage::user(build_story_prompt(request)),
        ];
        let options = CompletionOptions {
            max_tokens: request.max_tokens(),
            temperature: TEMPERATURE,
            json_mode,
        };

        let completion = self.llm.complete(&messages, &options).await?;
        let content = completion
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyContent)?;

        let draft = if json_mode {
            StoryDraft::from_json_content(&content)
        } else {
            StoryDraft::plain(content)
        };

        if draft.story.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }
        Ok(draft)
    }

    /// Moderation fails open: an unreachable endpoint never blocks a story
    async fn moderate(&self, story: &str) -> ModerationOutcome {
        match self.llm.moderate(story).await {
            Ok(verdict) => {
                if verdict.flagged {
                    tracing::warn!(categories = ?verdict.categories, "Generated story flagged by moderation");
                }
                ModerationOutcome {
                    checked: true,
                    flagged: verdict.flagged,
                }
            }
            Err(err) => {
                tracing::warn!("Moderation check failed, delivering story unchecked: {}", err);
                ModerationOutcome::unchecked()
            }
        }
    }

    /// Best-effort save; returns the stored record id when it worked
    async fn persist(
        &self,
        pet_id: &str,
        request: &StoryRequest,
        draft: &StoryDraft,
    ) -> Option<String> {
        if !self.store.is_configured() {
            tracing::debug!("Story persistence not configured, skipping save");
            return None;
        }

        let payload = XanoStoryPayload::from_draft(pet_id, request, draft);
        match self.store.save_story(&payload).await {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!("Story generated but not saved: {}", err);
                None
            }
        }
    }
}
