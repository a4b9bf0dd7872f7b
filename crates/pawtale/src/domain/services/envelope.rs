//! PIMS response envelope normalization
//!
//! The patients endpoint answers in several shapes. Shapes are tried in
//! order and the first match wins; the last one matches anything.

use serde_json::Value;

/// One recognized shape of a patient-list response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `[...]`
    BareArray,
    /// `{<key>: [...]}`
    Keyed(&'static str),
    /// Any other value, taken as a single record
    SingleRecord,
}

pub const ENVELOPE_SHAPES: [EnvelopeShape; 6] = [
    EnvelopeShape::BareArray,
    EnvelopeShape::Keyed("items"),
    EnvelopeShape::Keyed("data"),
    EnvelopeShape::Keyed("patients"),
    EnvelopeShape::Keyed("results"),
    EnvelopeShape::SingleRecord,
];

impl EnvelopeShape {
    pub fn matches(&self, body: &Value) -> bool {
        match self {
            EnvelopeShape::BareArray => body.is_array(),
            EnvelopeShape::Keyed(key) => body.get(*key).is_some_and(Value::is_array),
            EnvelopeShape::SingleRecord => true,
        }
    }

    /// Pull the records out of a body this shape matched
    pub fn extract(&self, body: Value) -> Vec<Value> {
        match (self, body) {
            (EnvelopeShape::BareArray, Value::Array(items)) => items,
            (EnvelopeShape::Keyed(key), Value::Object(mut obj)) => match obj.remove(*key) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            (_, body) => vec![body],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnvelopeShape::BareArray => "array",
            EnvelopeShape::Keyed(key) => *key,
            EnvelopeShape::SingleRecord => "single",
        }
    }
}

/// Unwrap a patient-list body into its records
pub fn normalize_envelope(body: Value) -> (EnvelopeShape, Vec<Value>) {
    let shape = ENVELOPE_SHAPES
        .into_iter()
        .find(|shape| shape.matches(&body))
        .unwrap_or(EnvelopeShape::SingleRecord);
    (shape, shape.extract(body))
}
