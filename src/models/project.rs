//! Portfolio projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::seeded_at;
use crate::repository::{Checks, Entity, FieldValue, ValidationResult, Validator};

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;
const FIRST_YEAR: f64 = 1970.0;
const LAST_YEAR: f64 = 2100.0;

/// A project shown on the projects page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Technology names, as shown on the project card
    pub technologies: Vec<String>,
    pub category: String,
    pub featured: bool,
    pub year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    pub year: u32,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial update. For the optional fields, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<Option<String>>,
    pub technologies: Option<Vec<String>>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub year: Option<u32>,
    pub github_url: Option<Option<String>>,
    pub live_url: Option<Option<String>>,
    pub image: Option<Option<String>>,
}

impl Entity for Project {
    type Create = NewProject;
    type Update = ProjectPatch;

    const ENTITY_TYPE: &'static str = "project";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_input(id: String, input: NewProject, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            long_description: input.long_description,
            technologies: input.technologies,
            category: input.category,
            featured: input.featured,
            year: input.year,
            github_url: input.github_url,
            live_url: input.live_url,
            image: input.image,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: ProjectPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(long_description) = patch.long_description {
            self.long_description = long_description;
        }
        if let Some(technologies) = patch.technologies {
            self.technologies = technologies;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(github_url) = patch.github_url {
            self.github_url = github_url;
        }
        if let Some(live_url) = patch.live_url {
            self.live_url = live_url;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "title" => FieldValue::from(&self.title),
            "description" => FieldValue::from(&self.description),
            "long_description" | "longDescription" => {
                FieldValue::from(self.long_description.as_deref())
            }
            "technologies" => FieldValue::from(self.technologies.as_slice()),
            "category" => FieldValue::from(&self.category),
            "featured" => FieldValue::Bool(self.featured),
            "year" => FieldValue::from(self.year),
            "github_url" | "githubUrl" => FieldValue::from(self.github_url.as_deref()),
            "live_url" | "liveUrl" => FieldValue::from(self.live_url.as_deref()),
            "image" => FieldValue::from(self.image.as_deref()),
            _ => return None,
        };
        Some(value)
    }
}

// == Validator ==
/// Title, description and category are required; links must be URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectValidator;

impl ProjectValidator {
    fn title(checks: &mut Checks, title: &str) {
        checks.required("title", title).max_len("title", title, TITLE_MAX);
    }

    fn description(checks: &mut Checks, description: &str) {
        checks
            .required("description", description)
            .max_len("description", description, DESCRIPTION_MAX);
    }

    fn year(checks: &mut Checks, year: u32) {
        checks.range("year", f64::from(year), FIRST_YEAR, LAST_YEAR);
    }
}

impl Validator<Project> for ProjectValidator {
    fn validate(&self, project: &Project) -> ValidationResult {
        let mut checks = Checks::new();
        Self::title(&mut checks, &project.title);
        Self::description(&mut checks, &project.description);
        Self::year(&mut checks, project.year);
        checks
            .required("category", &project.category)
            .url("github_url", project.github_url.as_deref())
            .url("live_url", project.live_url.as_deref())
            .finish()
    }

    fn validate_create(&self, input: &NewProject) -> ValidationResult {
        let mut checks = Checks::new();
        Self::title(&mut checks, &input.title);
        Self::description(&mut checks, &input.description);
        Self::year(&mut checks, input.year);
        checks
            .required("category", &input.category)
            .url("github_url", input.github_url.as_deref())
            .url("live_url", input.live_url.as_deref())
            .finish()
    }

    fn validate_update(&self, patch: &ProjectPatch) -> ValidationResult {
        let mut checks = Checks::new();
        if let Some(title) = &patch.title {
            Self::title(&mut checks, title);
        }
        if let Some(description) = &patch.description {
            Self::description(&mut checks, description);
        }
        if let Some(year) = patch.year {
            Self::year(&mut checks, year);
        }
        if let Some(category) = &patch.category {
            checks.required("category", category);
        }
        if let Some(github_url) = &patch.github_url {
            checks.url("github_url", github_url.as_deref());
        }
        if let Some(live_url) = &patch.live_url {
            checks.url("live_url", live_url.as_deref());
        }
        checks.finish()
    }
}

// == Seed Content ==
fn project(
    id: &str,
    title: &str,
    description: &str,
    technologies: &[&str],
    category: &str,
    featured: bool,
    year: u32,
) -> Project {
    let at = seeded_at();
    Project {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        long_description: None,
        technologies: technologies.iter().map(|t| t.to_string()).collect(),
        category: category.to_string(),
        featured,
        year,
        github_url: None,
        live_url: None,
        image: None,
        created_at: at,
        updated_at: at,
    }
}

/// Projects the site ships with.
pub fn seed() -> Vec<Project> {
    vec![
        Project {
            long_description: Some(
                "Storefront with server-rendered product pages, a cart kept in \
                 local storage and a checkout backed by a payment provider."
                    .to_string(),
            ),
            github_url: Some("https://github.com/example/shop-front".to_string()),
            live_url: Some("https://shop.example.com".to_string()),
            image: Some("/images/projects/shop-front.png".to_string()),
            ..project(
                "project-1",
                "E-commerce Platform",
                "Online store with product catalog, cart and checkout.",
                &["React", "TypeScript", "Node.js", "PostgreSQL"],
                "web",
                true,
                2024,
            )
        },
        Project {
            github_url: Some("https://github.com/example/taskboard".to_string()),
            image: Some("/images/projects/taskboard.png".to_string()),
            ..project(
                "project-2",
                "Task Management App",
                "Kanban board with drag and drop and real-time sync.",
                &["React", "Firebase", "Tailwind CSS"],
                "web",
                true,
                2023,
            )
        },
        Project {
            github_url: Some("https://github.com/example/logtail".to_string()),
            ..project(
                "project-3",
                "Log Tail CLI",
                "Terminal tool that follows and filters structured log files.",
                &["Rust"],
                "tooling",
                false,
                2023,
            )
        },
        Project {
            live_url: Some("https://weather.example.com".to_string()),
            ..project(
                "project-4",
                "Weather Dashboard",
                "Forecast dashboard with charts and saved locations.",
                &["Vue", "Chart.js", "OpenWeather API"],
                "web",
                false,
                2022,
            )
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ValidationErrorKind;

    fn valid_input() -> NewProject {
        NewProject {
            title: "Portfolio".into(),
            description: "This site".into(),
            category: "web".into(),
            year: 2024,
            github_url: Some("https://github.com/example/portfolio".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_is_valid_and_unique() {
        let projects = seed();
        let mut ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), projects.len());

        for project in &projects {
            assert!(ProjectValidator.validate(project).is_valid, "{}", project.id);
            assert!(project.updated_at >= project.created_at);
        }
    }

    #[test]
    fn test_validate_create() {
        assert!(ProjectValidator.validate_create(&valid_input()).is_valid);

        let input = NewProject {
            title: String::new(),
            github_url: Some("not a url".into()),
            year: 1200,
            ..valid_input()
        };
        let result = ProjectValidator.validate_create(&input);
        let fields: Vec<_> = result.errors.iter().filter_map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, vec!["title", "year", "github_url"]);
        assert_eq!(result.errors[0].kind, ValidationErrorKind::Required);
    }

    #[test]
    fn test_validate_update_checks_present_fields_only() {
        assert!(ProjectValidator.validate_update(&ProjectPatch::default()).is_valid);

        let clear_link = ProjectPatch {
            live_url: Some(None),
            ..Default::default()
        };
        assert!(ProjectValidator.validate_update(&clear_link).is_valid);

        let bad_link = ProjectPatch {
            live_url: Some(Some("ftp://example.com".into())),
            ..Default::default()
        };
        assert!(!ProjectValidator.validate_update(&bad_link).is_valid);
    }

    #[test]
    fn test_apply_update_clears_optional_field() {
        let mut project = seed().remove(0);
        project.apply_update(ProjectPatch {
            featured: Some(false),
            github_url: Some(None),
            ..Default::default()
        });
        assert!(!project.featured);
        assert!(project.github_url.is_none());
        assert_eq!(project.title, "E-commerce Platform");
    }

    #[test]
    fn test_fields() {
        let project = seed().remove(0);
        assert_eq!(project.field("year"), Some(FieldValue::Number(2024.0)));
        assert_eq!(project.field("featured"), Some(FieldValue::Bool(true)));
        assert_eq!(project.field("liveUrl"), project.field("live_url"));
        assert_eq!(project.field("name"), None);
        assert!(matches!(project.field("technologies"), Some(FieldValue::List(t)) if t.len() == 4));
    }
}
