//! Validation hook run before mutations.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RepositoryError, Result};
use crate::repository::Entity;

// == Validation Error ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Required,
    InvalidFormat,
    OutOfRange,
    TooLong,
}

/// One problem found in an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
        }
    }

    /// Attaches the offending field name.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

// == Validation Result ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Any error at all is a hard stop.
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(RepositoryError::validation(self.errors))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

// == Validator Trait ==
/// Checks inputs for one entity type.
pub trait Validator<E: Entity>: Send + Sync {
    /// Checks a complete entity.
    fn validate(&self, entity: &E) -> ValidationResult;

    /// Checks a create input before anything is stored.
    fn validate_create(&self, input: &E::Create) -> ValidationResult;

    /// Checks only the fields present in a patch.
    fn validate_update(&self, patch: &E::Update) -> ValidationResult;
}

/// Accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopValidator;

impl<E: Entity> Validator<E> for NoopValidator {
    fn validate(&self, _entity: &E) -> ValidationResult {
        ValidationResult::valid()
    }

    fn validate_create(&self, _input: &E::Create) -> ValidationResult {
        ValidationResult::valid()
    }

    fn validate_update(&self, _patch: &E::Update) -> ValidationResult {
        ValidationResult::valid()
    }
}

// == Checks ==
/// Accumulates field errors for a validator.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<ValidationError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails when `value` is empty or whitespace.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::Required,
                    format!("{} is required", label(field)),
                )
                .field(field),
            );
        }
        self
    }

    /// Fails when `value` has more than `max` characters.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::TooLong,
                    format!("{} must be at most {} characters", label(field), max),
                )
                .field(field),
            );
        }
        self
    }

    /// Fails when a present value is not an absolute http(s) or mailto URL.
    pub fn url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        let Some(value) = value else {
            return self;
        };
        let ok = Url::parse(value)
            .map(|u| matches!(u.scheme(), "http" | "https" | "mailto"))
            .unwrap_or(false);
        if !ok {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidFormat,
                    format!("{} must be a valid URL", label(field)),
                )
                .field(field),
            );
        }
        self
    }

    /// Fails when `value` is outside `min..=max`.
    pub fn range(&mut self, field: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !(min..=max).contains(&value) {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::OutOfRange,
                    format!("{} must be between {} and {}", label(field), min, max),
                )
                .field(field),
            );
        }
        self
    }

    /// Loose shape check: one `@`, something before it, a dotted domain after.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let ok = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
        if !ok {
            self.push(
                ValidationError::new(
                    ValidationErrorKind::InvalidFormat,
                    format!("{} must be a valid email address", label(field)),
                )
                .field(field),
            );
        }
        self
    }

    pub fn push(&mut self, error: ValidationError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn finish(&mut self) -> ValidationResult {
        ValidationResult::from_errors(std::mem::take(&mut self.errors))
    }
}

/// `github_url` -> `Github url`
fn label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        let result = Checks::new().required("title", "  ").finish();
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].kind, ValidationErrorKind::Required);
        assert_eq!(result.errors[0].field.as_deref(), Some("title"));
        assert_eq!(result.errors[0].message, "Title is required");
    }

    #[test]
    fn test_url() {
        let mut checks = Checks::new();
        checks
            .url("live_url", Some("https://example.com"))
            .url("contact", Some("mailto:me@example.com"))
            .url("github_url", None);
        assert!(checks.finish().is_valid);

        let result = Checks::new()
            .url("live_url", Some("not a url"))
            .url("image", Some("ftp://example.com/a.png"))
            .finish();
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].message, "Live url must be a valid URL");
    }

    #[test]
    fn test_range_and_length() {
        let result = Checks::new()
            .range("proficiency", 101.0, 0.0, 100.0)
            .max_len("title", "abcdef", 5)
            .finish();
        let kinds: Vec<_> = result.errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ValidationErrorKind::OutOfRange, ValidationErrorKind::TooLong]
        );
    }

    #[test]
    fn test_email() {
        assert!(Checks::new().email("value", "hi@example.com").finish().is_valid);
        for bad in ["", "hi", "@example.com", "hi@example", "a@b@c.com", "hi@.com"] {
            assert!(!Checks::new().email("value", bad).finish().is_valid, "{bad}");
        }
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationResult::valid().into_result().is_ok());
        let err = ValidationResult::from_errors(vec![ValidationError::new(
            ValidationErrorKind::Required,
            "Name is required",
        )])
        .into_result()
        .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { .. }));
    }

    #[test]
    fn test_error_serializes_type_field() {
        let err = ValidationError::new(ValidationErrorKind::Required, "Name is required")
            .field("name");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "required");
        assert_eq!(json["field"], "name");
    }
}
