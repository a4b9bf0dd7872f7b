//! Story - Generation request and response
//!
//! A `StoryRequest` only exists once the validator accepted it; nothing
//! mutates it afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::value_objects::StoryLength;

pub const DEFAULT_THEME: &str = "adventure";

/// Validated story-generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub pet_name: String,
    pub pet_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_breed: Option<String>,
    /// Age in years, strictly positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_age: Option<f64>,
    pub owner_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_length: Option<StoryLength>,
    /// Run the moderation API over the generated story
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_check: Option<bool>,
    /// PIMS patient the story is about; enables persistence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pims_pet_id: Option<String>,
}

impl StoryRequest {
    /// Minimal request with only the required fields
    pub fn new(
        pet_name: impl Into<String>,
        pet_type: impl Into<String>,
        owner_name: impl Into<String>,
    ) -> Self {
        Self {
            pet_name: pet_name.into(),
            pet_type: pet_type.into(),
            pet_breed: None,
            pet_age: None,
            owner_name: owner_name.into(),
            story_theme: None,
            story_length: None,
            moderation_check: None,
            pims_pet_id: None,
        }
    }

    pub fn theme(&self) -> &str {
        self.story_theme.as_deref().unwrap_or(DEFAULT_THEME)
    }

    pub fn length(&self) -> StoryLength {
        self.story_length.unwrap_or_default()
    }

    pub fn max_tokens(&self) -> u32 {
        StoryLength::budget_for(self.story_length)
    }

    pub fn pet_info(&self) -> PetInfo {
        PetInfo {
            name: self.pet_name.clone(),
            pet_type: self.pet_type.clone(),
            breed: self.pet_breed.clone(),
            age: self.pet_age,
        }
    }
}

/// Pet fields echoed back with a generated story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PetInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
}

/// Result of the optional moderation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModerationOutcome {
    /// False when the moderation endpoint could not be reached
    pub checked: bool,
    pub flagged: bool,
}

impl ModerationOutcome {
    pub fn unchecked() -> Self {
        Self {
            checked: false,
            flagged: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    pub generated_at: DateTime<Utc>,
    pub word_count: usize,
    pub theme: String,
    pub pet_info: PetInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationOutcome>,
    /// Record id assigned by the persistence backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_story_id: Option<String>,
}

/// Generated story returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoryResponse {
    pub story: String,
    pub metadata: StoryMetadata,
}

impl StoryResponse {
    pub fn assemble(request: &StoryRequest, story: String, generated_at: DateTime<Utc>) -> Self {
        let word_count = count_words(&story);
        Self {
            metadata: StoryMetadata {
                generated_at,
                word_count,
                theme: request.theme().to_string(),
                pet_info: request.pet_info(),
                moderation: None,
                saved_story_id: None,
            },
            story,
        }
    }
}

/// Words are maximal runs of non-whitespace
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
