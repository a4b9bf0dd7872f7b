//! ModerationMode - What happens to a story the moderation API flags

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModerationMode {
    /// Deliver the story with `flagged: true` in its metadata
    #[default]
    Flag,
    /// Refuse to deliver a flagged story
    Reject,
}

impl std::str::FromStr for ModerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flag" => Ok(ModerationMode::Flag),
            "reject" => Ok(ModerationMode::Reject),
            _ => Err(format!("Unknown moderation mode: {}. Valid: flag, reject", s)),
        }
    }
}
