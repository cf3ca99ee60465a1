//! Portfolio Content Models
//!
//! The four entity types the site renders, each with its create and patch
//! inputs, a validator and the content it ships with.

pub mod about;
pub mod contact;
pub mod project;
pub mod technology;

use chrono::{DateTime, Utc};

pub use about::{AboutContent, AboutContentPatch, AboutContentValidator, NewAboutContent};
pub use contact::{ContactInfo, ContactInfoPatch, ContactInfoValidator, NewContactInfo};
pub use project::{NewProject, Project, ProjectPatch, ProjectValidator};
pub use technology::{NewTechnology, Technology, TechnologyPatch, TechnologyValidator};

/// Unix seconds for 2024-01-01T00:00:00Z
const SEEDED_AT_SECS: i64 = 1_704_067_200;

/// Creation time stamped on seed content.
pub(crate) fn seeded_at() -> DateTime<Utc> {
    DateTime::from_timestamp(SEEDED_AT_SECS, 0).unwrap_or_default()
}
