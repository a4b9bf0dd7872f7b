//! SavedStory - Record written to the low-code persistence backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{StoryDraft, StoryRequest};

/// Body POSTed to the `generated_stories` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XanoStoryPayload {
    pub pims_pet_id: String,
    pub title: String,
    pub content: String,
    pub tone: String,
    /// Funding target proposed by the model, when it gave one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_goal: Option<f64>,
    pub key_points: Vec<String>,
    pub form_data: Map<String, Value>,
}

impl XanoStoryPayload {
    pub fn from_draft(pims_pet_id: &str, request: &StoryRequest, draft: &StoryDraft) -> Self {
        let form_data = match serde_json::to_value(request) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Self {
            pims_pet_id: pims_pet_id.to_string(),
            title: draft
                .title
                .clone()
                .unwrap_or_else(|| format!("{}'s {} story", request.pet_name, request.theme())),
            content: draft.story.clone(),
            tone: draft
                .tone
                .clone()
                .unwrap_or_else(|| request.theme().to_string()),
            suggested_goal: draft.suggested_goal,
            key_points: draft.key_points.clone(),
            form_data,
        }
    }
}
