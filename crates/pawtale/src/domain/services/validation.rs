//! Story request validation
//!
//! Works on the raw JSON body so that a wrong type in one field does not
//! hide violations in the others. Every violation is collected.

use serde_json::{Map, Value};

use crate::domain::entities::{PetId, StoryRequest};
use crate::domain::errors::{FieldViolation, ValidationError, ViolationCode};
use crate::domain::value_objects::StoryLength;

/// Validate and normalize an inbound generate-story body
pub fn validate_story_request(body: &Value) -> Result<StoryRequest, ValidationError> {
    let Some(obj) = body.as_object() else {
        return Err(ValidationError::new(vec![FieldViolation::new(
            "",
            ViolationCode::InvalidType,
            format!("Expected object, received {}", type_name(body)),
        )]));
    };

    let mut violations = Vec::new();

    let pet_name = required_string(obj, "petName", "Pet name is required", &mut violations);
    let pet_type = required_string(obj, "petType", "Pet type is required", &mut violations);
    let owner_name = required_string(obj, "ownerName", "Owner name is required", &mut violations);
    let pet_breed = optional_string(obj, "petBreed", &mut violations);
    let story_theme = optional_string(obj, "storyTheme", &mut violations);
    let pet_age = positive_number(obj, "petAge", &mut violations);
    let story_length = story_length(obj, &mut violations);
    let moderation_check = optional_bool(obj, "moderationCheck", &mut violations);
    let pims_pet_id = optional_id(obj, "pimsPetId", &mut violations);

    match (pet_name, pet_type, owner_name) {
        (Some(pet_name), Some(pet_type), Some(owner_name)) if violations.is_empty() => {
            Ok(StoryRequest {
                pet_name,
                pet_type,
                pet_breed,
                pet_age,
                owner_name,
                story_theme,
                story_length,
                moderation_check,
                pims_pet_id,
            })
        }
        _ => Err(ValidationError::new(violations)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(field: &str, expected: &str, value: &Value) -> FieldViolation {
    FieldViolation::new(
        field,
        ViolationCode::InvalidType,
        format!("Expected {}, received {}", expected, type_name(value)),
    )
}

/// Absent and null are both treated as "not provided"
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required_string(
    obj: &Map<String, Value>,
    field: &str,
    missing: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match present(obj, field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) | None => {
            violations.push(FieldViolation::new(field, ViolationCode::Required, missing));
            None
        }
        Some(other) => {
            violations.push(wrong_type(field, "string", other));
            None
        }
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match present(obj, field)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => {
            violations.push(wrong_type(field, "string", other));
            None
        }
    }
}

fn positive_number(
    obj: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<f64> {
    match present(obj, field)? {
        Value::Number(n) => match n.as_f64() {
            Some(age) if age > 0.0 => Some(age),
            _ => {
                violations.push(FieldViolation::new(
                    field,
                    ViolationCode::TooSmall,
                    "Number must be greater than 0",
                ));
                None
            }
        },
        other => {
            violations.push(wrong_type(field, "number", other));
            None
        }
    }
}

fn story_length(
    obj: &Map<String, Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<StoryLength> {
    const FIELD: &str = "storyLength";
    let expected = StoryLength::VARIANTS
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(" | ");

    match present(obj, FIELD)? {
        Value::String(s) => match s.parse() {
            Ok(length) => Some(length),
            Err(_) => {
                violations.push(FieldViolation::new(
                    FIELD,
                    ViolationCode::InvalidEnumValue,
                    format!("Invalid enum value. Expected {}, received '{}'", expected, s),
                ));
                None
            }
        },
        other => {
            violations.push(wrong_type(FIELD, &expected, other));
            None
        }
    }
}

fn optional_bool(
    obj: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<bool> {
    match present(obj, field)? {
        Value::Bool(b) => Some(*b),
        other => {
            violations.push(wrong_type(field, "boolean", other));
            None
        }
    }
}

fn optional_id(
    obj: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match present(obj, field)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(PetId::Number(n.clone()).to_string()),
        other => {
            violations.push(wrong_type(field, "string or number", other));
            None
        }
    }
}
