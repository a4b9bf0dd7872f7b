//! StoryLength - Requested size of a generated story

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Story length, mapped to a completion token budget
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl StoryLength {
    pub const VARIANTS: [&'static str; 3] = ["short", "medium", "long"];

    /// Completion token budget for this length
    pub fn max_tokens(self) -> u32 {
        match self {
            StoryLength::Short => 200,
            StoryLength::Medium => 400,
            StoryLength::Long => 800,
        }
    }

    /// Token budget for an optional length (absent means medium)
    pub fn budget_for(length: Option<StoryLength>) -> u32 {
        length.unwrap_or_default().max_tokens()
    }
}

impl std::fmt::Display for StoryLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoryLength::Short => write!(f, "short"),
            StoryLength::Medium => write!(f, "medium"),
            StoryLength::Long => write!(f, "long"),
        }
    }
}

impl std::str::FromStr for StoryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(StoryLength::Short),
            "medium" => Ok(StoryLength::Medium),
            "long" => Ok(StoryLength::Long),
            _ => Err(format!("Unknown story length: {}", s)),
        }
    }
}
