//! StoryDraft - Content extracted from a completion
//!
//! In JSON mode the model answers with an object carrying the story plus
//! campaign fields; otherwise the whole completion is the story.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoryDraft {
    pub title: Option<String>,
    pub story: String,
    pub tone: Option<String>,
    pub suggested_goal: Option<f64>,
    pub key_points: Vec<String>,
}

impl StoryDraft {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            story: content.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON-mode completion, falling back to plain text
    pub fn from_json_content(content: &str) -> Self {
        let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(content) else {
            return Self::plain(content);
        };

        let story = ["story", "content"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        let Some(story) = story else {
            return Self::plain(content);
        };

        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let suggested_goal = obj.get("suggested_goal").and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse::<f64>().ok(),
            _ => None,
        });

        let key_points = obj
            .get("key_points")
            .and_then(Value::as_array)
            .map(|points| {
                points
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: text("title"),
            story,
            tone: text("tone"),
            suggested_goal,
            key_points,
        }
    }
}
