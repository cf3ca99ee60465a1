//! Entity contract and typed field access.

use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fields `search` looks at, when an entity exposes them as text.
pub const SEARCH_FIELDS: [&str; 4] = ["title", "name", "description", "content"];

// == Field Value ==
/// Typed value of a named entity field.
///
/// Sorting and filtering go through these instead of indexing records by
/// arbitrary string keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
    Timestamp(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Orders two values of the same kind. Mismatched kinds and nulls
    /// compare equal, which leaves their relative order untouched under a
    /// stable sort.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String form used for case-insensitive containment checks.
    pub fn to_match_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(items) => items.join(","),
            FieldValue::Timestamp(t) => t.to_rfc3339(),
            FieldValue::Null => String::new(),
        }
    }
}

/// Formats integral floats without a trailing `.0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&[String]> for FieldValue {
    fn from(value: &[String]) -> Self {
        FieldValue::List(value.to_vec())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

// == Entity Trait ==
/// A uniquely identified, timestamped record a repository can manage.
///
/// `Create` is the entity minus id and timestamps; `Update` is a partial
/// `Create` where `None` leaves a field unchanged.
pub trait Entity: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static {
    type Create: Clone + Debug + Send + Sync + 'static;
    type Update: Clone + Debug + Send + Sync + 'static;

    /// Name used in logs and audit events
    const ENTITY_TYPE: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Builds a new entity with both timestamps set to `now`.
    fn from_input(id: String, input: Self::Create, now: DateTime<Utc>) -> Self;

    /// Merges the present fields of `patch`; does not touch timestamps.
    fn apply_update(&mut self, patch: Self::Update);

    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Accessor for domain fields. `None` means the entity has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Accessor covering the common fields as well as domain ones.
    fn value_of(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Text(self.id().to_string())),
            "created_at" | "createdAt" => Some(FieldValue::Timestamp(self.created_at())),
            "updated_at" | "updatedAt" => Some(FieldValue::Timestamp(self.updated_at())),
            _ => self.field(name),
        }
    }
}
