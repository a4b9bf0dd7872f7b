//! Pet - A patient record from the PIMS API
//!
//! The upstream schema is not contractually stable: records pass through
//! untouched and the few fields the service reads are typed on access.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Patient identifier as the upstream sent it (string or number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PetId {
    Text(String),
    Number(serde_json::Number),
}

impl PetId {
    /// Whether `query` identifies this pet, by string or numeric-string equality
    pub fn matches(&self, query: &str) -> bool {
        let stored = self.to_string();
        if stored == query {
            return true;
        }
        canonical_number(query).is_some_and(|n| n == stored)
    }
}

impl std::fmt::Display for PetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PetId::Text(s) => write!(f, "{}", s),
            PetId::Number(n) => match n.as_f64().and_then(format_number) {
                Some(s) => write!(f, "{}", s),
                None => write!(f, "{}", n),
            },
        }
    }
}

/// Canonical decimal form of a numeric string ("042" and "42.0" become "42")
fn canonical_number(s: &str) -> Option<String> {
    s.trim().parse::<f64>().ok().and_then(format_number)
}

fn format_number(n: f64) -> Option<String> {
    if !n.is_finite() {
        return None;
    }
    // Integral values within the exactly-representable range print without a fraction
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Some(format!("{}", n as i64))
    } else {
        Some(format!("{}", n))
    }
}

/// PIMS patient record
///
/// Kept exactly as the upstream sent it, explicit nulls included. Typed
/// views are read on demand and never reject a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PimsPet {
    fields: Map<String, Value>,
}

impl PimsPet {
    /// Wrap a record; only JSON objects are pet records
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<PetId> {
        match self.fields.get("id")? {
            Value::String(s) => Some(PetId::Text(s.clone())),
            Value::Number(n) => Some(PetId::Number(n.clone())),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn species(&self) -> Option<&str> {
        self.text("species")
    }

    pub fn breed(&self) -> Option<&str> {
        self.text("breed")
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.text("owner_name")
    }

    /// Medical history entries in upstream order; empty unless it is an array
    pub fn medical_history(&self) -> &[Value] {
        self.fields
            .get("medical_history")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Raw field, whatever its type
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn has_id(&self, query: &str) -> bool {
        self.id().is_some_and(|id| id.matches(query))
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}
