//! Sections of the about page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::seeded_at;
use crate::repository::{Checks, Entity, FieldValue, ValidationResult, Validator};

const TITLE_MAX: usize = 100;
const CONTENT_MAX: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutContent {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Page section this block belongs to, e.g. `intro` or `experience`
    pub section: String,
    /// Position within the section
    pub order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewAboutContent {
    pub title: String,
    pub content: String,
    pub section: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AboutContentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub section: Option<String>,
    pub order: Option<u32>,
}

impl Entity for AboutContent {
    type Create = NewAboutContent;
    type Update = AboutContentPatch;

    const ENTITY_TYPE: &'static str = "about";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_input(id: String, input: NewAboutContent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            section: input.section,
            order: input.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: AboutContentPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(section) = patch.section {
            self.section = section;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "title" => FieldValue::from(&self.title),
            "content" => FieldValue::from(&self.content),
            "section" => FieldValue::from(&self.section),
            "order" => FieldValue::from(self.order),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AboutContentValidator;

fn check(checks: &mut Checks, title: Option<&str>, content: Option<&str>, section: Option<&str>) {
    if let Some(title) = title {
        checks.required("title", title).max_len("title", title, TITLE_MAX);
    }
    if let Some(content) = content {
        checks
            .required("content", content)
            .max_len("content", content, CONTENT_MAX);
    }
    if let Some(section) = section {
        checks.required("section", section);
    }
}

impl Validator<AboutContent> for AboutContentValidator {
    fn validate(&self, about: &AboutContent) -> ValidationResult {
        let mut checks = Checks::new();
        check(
            &mut checks,
            Some(about.title.as_str()),
            Some(about.content.as_str()),
            Some(about.section.as_str()),
        );
        checks.finish()
    }

    fn validate_create(&self, input: &NewAboutContent) -> ValidationResult {
        let mut checks = Checks::new();
        check(
            &mut checks,
            Some(input.title.as_str()),
            Some(input.content.as_str()),
            Some(input.section.as_str()),
        );
        checks.finish()
    }

    fn validate_update(&self, patch: &AboutContentPatch) -> ValidationResult {
        let mut checks = Checks::new();
        check(
            &mut checks,
            patch.title.as_deref(),
            patch.content.as_deref(),
            patch.section.as_deref(),
        );
        checks.finish()
    }
}

// == Seed Content ==
fn block(id: &str, section: &str, order: u32, title: &str, content: &str) -> AboutContent {
    let at = seeded_at();
    AboutContent {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        section: section.to_string(),
        order,
        created_at: at,
        updated_at: at,
    }
}

pub fn seed() -> Vec<AboutContent> {
    vec![
        block(
            "about-1",
            "intro",
            1,
            "Hi, I'm a full-stack developer",
            "I build web applications end to end, from database schema to \
             the last pixel of the interface.",
        ),
        block(
            "about-2",
            "experience",
            1,
            "Senior Frontend Engineer",
            "Led the rewrite of a customer dashboard and set up the design \
             system used across four product teams.",
        ),
        block(
            "about-3",
            "experience",
            2,
            "Full-stack Developer",
            "Shipped booking and payments features for a travel startup.",
        ),
        block(
            "about-4",
            "interests",
            1,
            "Outside of work",
            "Systems programming in Rust, trail running and film photography.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_valid() {
        for about in seed() {
            assert!(AboutContentValidator.validate(&about).is_valid, "{}", about.id);
        }
    }

    #[test]
    fn test_content_length_limit() {
        let input = NewAboutContent {
            title: "Long".into(),
            content: "x".repeat(CONTENT_MAX + 1),
            section: "intro".into(),
            order: 1,
        };
        let result = AboutContentValidator.validate_create(&input);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("content"));
    }

    #[test]
    fn test_update_checks_present_fields_only() {
        let patch = AboutContentPatch {
            order: Some(3),
            ..Default::default()
        };
        assert!(AboutContentValidator.validate_update(&patch).is_valid);

        let blank = AboutContentPatch {
            section: Some(" ".into()),
            ..Default::default()
        };
        assert!(!AboutContentValidator.validate_update(&blank).is_valid);
    }

    #[test]
    fn test_fields() {
        let intro = seed().remove(0);
        assert_eq!(intro.field("order"), Some(FieldValue::Number(1.0)));
        assert_eq!(intro.field("section"), Some(FieldValue::from("intro")));
    }
}
