//! Contact channels shown on the contact page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::seeded_at;
use crate::repository::{Checks, Entity, FieldValue, ValidationResult, Validator};

/// Kind whose `value` must look like an email address.
pub const EMAIL_KIND: &str = "email";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: String,
    /// Display label, e.g. "GitHub"
    pub name: String,
    /// Channel kind: `email`, `github`, `linkedin`, `location`, ...
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewContactInfo {
    pub name: String,
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactInfoPatch {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub value: Option<String>,
    pub href: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub primary: Option<bool>,
}

impl Entity for ContactInfo {
    type Create = NewContactInfo;
    type Update = ContactInfoPatch;

    const ENTITY_TYPE: &'static str = "contact";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_input(id: String, input: NewContactInfo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            kind: input.kind,
            value: input.value,
            href: input.href,
            icon: input.icon,
            primary: input.primary,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: ContactInfoPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(href) = patch.href {
            self.href = href;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(primary) = patch.primary {
            self.primary = primary;
        }
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "name" => FieldValue::from(&self.name),
            "kind" | "type" => FieldValue::from(&self.kind),
            "value" => FieldValue::from(&self.value),
            "href" => FieldValue::from(self.href.as_deref()),
            "icon" => FieldValue::from(self.icon.as_deref()),
            "primary" => FieldValue::Bool(self.primary),
            _ => return None,
        };
        Some(value)
    }
}

// == Validator ==
/// Email-kind values must be email addresses; links must be URLs.
///
/// A patch that changes `value` without `kind` cannot be checked against
/// the stored kind here, so only the value's presence is checked. An email
/// contact can therefore be patched to a non-email value unless the patch
/// also carries `kind`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactInfoValidator;

impl ContactInfoValidator {
    fn value(checks: &mut Checks, kind: Option<&str>, value: &str) {
        checks.required("value", value);
        if kind.is_some_and(|k| k.eq_ignore_ascii_case(EMAIL_KIND)) && !value.trim().is_empty() {
            checks.email("value", value);
        }
    }
}

impl Validator<ContactInfo> for ContactInfoValidator {
    fn validate(&self, contact: &ContactInfo) -> ValidationResult {
        let mut checks = Checks::new();
        checks
            .required("name", &contact.name)
            .required("kind", &contact.kind);
        Self::value(&mut checks, Some(contact.kind.as_str()), &contact.value);
        checks.url("href", contact.href.as_deref()).finish()
    }

    fn validate_create(&self, input: &NewContactInfo) -> ValidationResult {
        let mut checks = Checks::new();
        checks.required("name", &input.name).required("kind", &input.kind);
        Self::value(&mut checks, Some(input.kind.as_str()), &input.value);
        checks.url("href", input.href.as_deref()).finish()
    }

    fn validate_update(&self, patch: &ContactInfoPatch) -> ValidationResult {
        let mut checks = Checks::new();
        if let Some(name) = &patch.name {
            checks.required("name", name);
        }
        if let Some(kind) = &patch.kind {
            checks.required("kind", kind);
        }
        if let Some(value) = &patch.value {
            Self::value(&mut checks, patch.kind.as_deref(), value);
        }
        if let Some(href) = &patch.href {
            checks.url("href", href.as_deref());
        }
        checks.finish()
    }
}

// == Seed Content ==
fn contact(id: &str, name: &str, kind: &str, value: &str, href: Option<&str>) -> ContactInfo {
    let at = seeded_at();
    ContactInfo {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        value: value.to_string(),
        href: href.map(str::to_string),
        icon: Some(kind.to_string()),
        primary: false,
        created_at: at,
        updated_at: at,
    }
}

pub fn seed() -> Vec<ContactInfo> {
    vec![
        ContactInfo {
            primary: true,
            ..contact(
                "contact-1",
                "Email",
                EMAIL_KIND,
                "hello@example.com",
                Some("mailto:hello@example.com"),
            )
        },
        contact(
            "contact-2",
            "GitHub",
            "github",
            "github.com/example",
            Some("https://github.com/example"),
        ),
        contact(
            "contact-3",
            "LinkedIn",
            "linkedin",
            "linkedin.com/in/example",
            Some("https://www.linkedin.com/in/example"),
        ),
        contact("contact-4", "Location", "location", "Lisbon, Portugal", None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ValidationErrorKind;

    #[test]
    fn test_seed_is_valid() {
        let contacts = seed();
        for contact in &contacts {
            assert!(ContactInfoValidator.validate(contact).is_valid, "{}", contact.id);
        }
        assert_eq!(contacts.iter().filter(|c| c.primary).count(), 1);
    }

    #[test]
    fn test_email_kind_requires_email_value() {
        let input = NewContactInfo {
            name: "Email".into(),
            kind: "email".into(),
            value: "not-an-address".into(),
            ..Default::default()
        };
        let result = ContactInfoValidator.validate_create(&input);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ValidationErrorKind::InvalidFormat);

        let other = NewContactInfo {
            kind: "location".into(),
            ..input
        };
        assert!(ContactInfoValidator.validate_create(&other).is_valid);
    }

    #[test]
    fn test_empty_email_reports_required_only() {
        let input = NewContactInfo {
            name: "Email".into(),
            kind: "email".into(),
            ..Default::default()
        };
        let result = ContactInfoValidator.validate_create(&input);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ValidationErrorKind::Required);
    }

    #[test]
    fn test_update_with_kind_and_value() {
        let patch = ContactInfoPatch {
            kind: Some("email".into()),
            value: Some("me@".into()),
            ..Default::default()
        };
        assert!(!ContactInfoValidator.validate_update(&patch).is_valid);

        // Without `kind` the stored kind is unknown, so no format check
        let value_only = ContactInfoPatch {
            value: Some("me@".into()),
            ..Default::default()
        };
        assert!(ContactInfoValidator.validate_update(&value_only).is_valid);
    }

    #[test]
    fn test_type_alias_field() {
        let email = seed().remove(0);
        assert_eq!(email.field("type"), Some(FieldValue::from("email")));
        assert_eq!(email.field("primary"), Some(FieldValue::Bool(true)));
    }
}
