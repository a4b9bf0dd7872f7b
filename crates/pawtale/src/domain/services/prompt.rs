//! Story prompt rendering

use crate::domain::entities::StoryRequest;

/// System instruction for plain-text stories
pub const STORY_SYSTEM_PROMPT: &str = "You are a creative storyteller who writes engaging, heartwarming stories about pets. Your stories should be family-friendly, imaginative, and capture the unique personality of each pet.";

/// System instruction when the completion must be a JSON object
pub const STORY_SYSTEM_PROMPT_JSON: &str = "You are a creative storyteller who writes engaging, heartwarming stories about pets. Your stories should be family-friendly, imaginative, and capture the unique personality of each pet. Always respond with valid JSON only, as an object with the keys \"title\" (string), \"story\" (string), \"tone\" (string), \"suggested_goal\" (number) and \"key_points\" (array of strings).";

/// Render the user prompt for a validated request
pub fn build_story_prompt(request: &StoryRequest) -> String {
    let mut prompt = format!(
        "Write a {length} {theme} story about a {pet_type} named {name}",
        length = request.length(),
        theme = request.theme(),
        pet_type = request.pet_type,
        name = request.pet_name,
    );

    if let Some(breed) = &request.pet_breed {
        prompt.push_str(&format!(" who is a {}", breed));
    }

    if let Some(age) = request.pet_age {
        prompt.push_str(&format!(" and is {} years old", age));
    }

    prompt.push_str(&format!(
        ". The pet's owner is {owner}. Make the story engaging, heartwarming, and suitable for all ages. Include specific details about {name}'s personality and the bond with {owner}.",
        owner = request.owner_name,
        name = request.pet_name,
    ));

    prompt
}
