//! Technologies listed in the skills section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::seeded_at;
use crate::repository::{Checks, Entity, FieldValue, ValidationResult, Validator};

const NAME_MAX: usize = 50;
const MAX_YEARS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Self-assessed, 0 to 100
    pub proficiency: u8,
    pub years_experience: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewTechnology {
    pub name: String,
    pub category: String,
    pub proficiency: u8,
    #[serde(default)]
    pub years_experience: f64,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnologyPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<u8>,
    pub years_experience: Option<f64>,
    pub icon: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl Entity for Technology {
    type Create = NewTechnology;
    type Update = TechnologyPatch;

    const ENTITY_TYPE: &'static str = "technology";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_input(id: String, input: NewTechnology, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            category: input.category,
            proficiency: input.proficiency,
            years_experience: input.years_experience,
            icon: input.icon,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: TechnologyPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(proficiency) = patch.proficiency {
            self.proficiency = proficiency;
        }
        if let Some(years) = patch.years_experience {
            self.years_experience = years;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "name" => FieldValue::from(&self.name),
            "category" => FieldValue::from(&self.category),
            "proficiency" => FieldValue::from(self.proficiency),
            "years_experience" | "yearsExperience" => FieldValue::Number(self.years_experience),
            "icon" => FieldValue::from(self.icon.as_deref()),
            "description" => FieldValue::from(self.description.as_deref()),
            _ => return None,
        };
        Some(value)
    }
}

// == Validator ==
#[derive(Debug, Default, Clone, Copy)]
pub struct TechnologyValidator;

impl TechnologyValidator {
    fn name(checks: &mut Checks, name: &str) {
        checks.required("name", name).max_len("name", name, NAME_MAX);
    }

    fn numbers(checks: &mut Checks, proficiency: Option<u8>, years: Option<f64>) {
        if let Some(proficiency) = proficiency {
            checks.range("proficiency", f64::from(proficiency), 0.0, 100.0);
        }
        if let Some(years) = years {
            checks.range("years_experience", years, 0.0, MAX_YEARS);
        }
    }
}

impl Validator<Technology> for TechnologyValidator {
    fn validate(&self, technology: &Technology) -> ValidationResult {
        let mut checks = Checks::new();
        Self::name(&mut checks, &technology.name);
        checks.required("category", &technology.category);
        Self::numbers(
            &mut checks,
            Some(technology.proficiency),
            Some(technology.years_experience),
        );
        checks.finish()
    }

    fn validate_create(&self, input: &NewTechnology) -> ValidationResult {
        let mut checks = Checks::new();
        Self::name(&mut checks, &input.name);
        checks.required("category", &input.category);
        Self::numbers(&mut checks, Some(input.proficiency), Some(input.years_experience));
        checks.finish()
    }

    fn validate_update(&self, patch: &TechnologyPatch) -> ValidationResult {
        let mut checks = Checks::new();
        if let Some(name) = &patch.name {
            Self::name(&mut checks, name);
        }
        if let Some(category) = &patch.category {
            checks.required("category", category);
        }
        Self::numbers(&mut checks, patch.proficiency, patch.years_experience);
        checks.finish()
    }
}

// == Seed Content ==
fn technology(id: &str, name: &str, category: &str, proficiency: u8, years: f64) -> Technology {
    let at = seeded_at();
    Technology {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        proficiency,
        years_experience: years,
        icon: Some(format!("/icons/{}.svg", name.to_lowercase().replace(['.', ' '], "-"))),
        description: None,
        created_at: at,
        updated_at: at,
    }
}

pub fn seed() -> Vec<Technology> {
    vec![
        technology("tech-1", "TypeScript", "language", 90, 5.0),
        technology("tech-2", "React", "frontend", 90, 5.0),
        technology("tech-3", "Node.js", "backend", 80, 4.0),
        technology("tech-4", "Rust", "language", 65, 2.0),
        technology("tech-5", "PostgreSQL", "database", 70, 4.0),
        technology("tech-6", "Tailwind CSS", "frontend", 85, 3.0),
        Technology {
            description: Some("Containers for local development and deployment".to_string()),
            ..technology("tech-7", "Docker", "devops", 60, 3.0)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_valid() {
        for technology in seed() {
            assert!(TechnologyValidator.validate(&technology).is_valid, "{}", technology.id);
        }
        assert_eq!(seed()[2].icon.as_deref(), Some("/icons/node-js.svg"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let input = NewTechnology {
            category: "language".into(),
            proficiency: 50,
            ..Default::default()
        };
        let result = TechnologyValidator.validate_create(&input);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field.as_deref(), Some("name"));
    }

    #[test]
    fn test_proficiency_range() {
        let patch = TechnologyPatch {
            proficiency: Some(101),
            years_experience: Some(-1.0),
            ..Default::default()
        };
        let result = TechnologyValidator.validate_update(&patch);
        let fields: Vec<_> = result.errors.iter().filter_map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, vec!["proficiency", "years_experience"]);

        let ok = TechnologyPatch {
            proficiency: Some(100),
            ..Default::default()
        };
        assert!(TechnologyValidator.validate_update(&ok).is_valid);
    }

    #[test]
    fn test_fields() {
        let rust = seed().remove(3);
        assert_eq!(rust.field("name"), Some(FieldValue::from("Rust")));
        assert_eq!(rust.field("proficiency"), Some(FieldValue::Number(65.0)));
        assert_eq!(rust.field("description"), Some(FieldValue::Null));
        assert_eq!(rust.field("title"), None);
    }
}
