//! Field filters applied by `filter` and `count`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::repository::entity::format_number;
use crate::repository::{Entity, FieldValue};

/// Field name to expected value. All entries must match.
pub type Filters = BTreeMap<String, FilterValue>;

// == Filter Value ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Ignored
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    TextList(Vec<String>),
    NumberList(Vec<f64>),
}

impl FilterValue {
    /// Checks one entity field against this filter value.
    ///
    /// - lists: a list field must share an element exactly; any other field
    ///   must contain one of the elements as a case-insensitive substring
    /// - text: case-insensitive substring on text fields, otherwise no match
    /// - numbers and booleans: equality
    /// - `Null` always matches; a missing field matches nothing else
    pub fn matches(&self, field: Option<&FieldValue>) -> bool {
        if matches!(self, FilterValue::Null) {
            return true;
        }
        let Some(field) = field else {
            return false;
        };

        match self {
            FilterValue::Null => true,
            FilterValue::TextList(needles) => match field {
                FieldValue::List(items) => items.iter().any(|item| needles.contains(item)),
                other => contains_any(other, needles.iter().map(String::as_str)),
            },
            // List fields only hold text, so numbers never share an element
            FilterValue::NumberList(needles) => match field {
                FieldValue::List(_) => false,
                other => {
                    let needles: Vec<String> = needles.iter().map(|n| format_number(*n)).collect();
                    contains_any(other, needles.iter().map(String::as_str))
                }
            },
            FilterValue::Text(needle) => match field {
                FieldValue::Text(value) => value.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            FilterValue::Number(expected) => {
                matches!(field, FieldValue::Number(value) if value == expected)
            }
            FilterValue::Bool(expected) => {
                matches!(field, FieldValue::Bool(value) if value == expected)
            }
        }
    }
}

fn contains_any<'a>(field: &FieldValue, mut needles: impl Iterator<Item = &'a str>) -> bool {
    let haystack = field.to_match_string().to_lowercase();
    needles.any(|needle| haystack.contains(&needle.to_lowercase()))
}

/// True when `entity` satisfies every filter entry.
pub fn matches_all<E: Entity>(entity: &E, filters: &Filters) -> bool {
    filters
        .iter()
        .all(|(name, expected)| expected.matches(entity.value_of(name).as_ref()))
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(value: Vec<&str>) -> Self {
        FilterValue::TextList(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        FilterValue::TextList(value)
    }
}

impl From<Vec<f64>> for FilterValue {
    fn from(value: Vec<f64>) -> Self {
        FilterValue::NumberList(value)
    }
}
