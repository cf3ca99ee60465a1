//! Small entity and stores shared by the repository tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::config::RepositoryConfig;
use crate::error::StoreError;
use crate::repository::{
    Checks, Entity, FieldValue, MemoryStore, Repository, Store, ValidationResult, Validator,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub priority: f64,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub pinned: Option<bool>,
}

impl Entity for Note {
    type Create = NewNote;
    type Update = NotePatch;

    const ENTITY_TYPE: &'static str = "note";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn from_input(id: String, input: NewNote, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            body: input.body,
            tags: input.tags,
            priority: 0.0,
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "title" => Some(FieldValue::from(&self.title)),
            "content" => Some(FieldValue::from(&self.body)),
            "tags" => Some(FieldValue::from(self.tags.as_slice())),
            "priority" => Some(FieldValue::Number(self.priority)),
            "pinned" => Some(FieldValue::Bool(self.pinned)),
            _ => None,
        }
    }
}

/// Rejects blank titles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoteValidator;

impl Validator<Note> for NoteValidator {
    fn validate(&self, entity: &Note) -> ValidationResult {
        Checks::new().required("title", &entity.title).finish()
    }

    fn validate_create(&self, input: &NewNote) -> ValidationResult {
        Checks::new().required("title", &input.title).finish()
    }

    fn validate_update(&self, patch: &NotePatch) -> ValidationResult {
        let mut checks = Checks::new();
        if let Some(title) = &patch.title {
            checks.required("title", title);
        }
        checks.finish()
    }
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Stored note with a fixed id and timestamps.
pub fn note(id: &str, title: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        body: format!("{title} body"),
        tags: Vec::new(),
        priority: 0.0,
        pinned: false,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub fn new_note(title: &str) -> NewNote {
    NewNote {
        title: title.to_string(),
        body: format!("{title} body"),
        tags: Vec::new(),
    }
}

pub fn seeded(items: Vec<Note>) -> Repository<Note, MemoryStore<Note>, NoteValidator> {
    Repository::new(
        MemoryStore::new(items),
        NoteValidator,
        RepositoryConfig::default(),
    )
}

/// Store whose load or save can be made to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    seed: Vec<Note>,
    fail_load: bool,
    fail_save: bool,
}

impl FailingStore {
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Default::default()
        }
    }

    pub fn failing_save(seed: Vec<Note>) -> Self {
        Self {
            seed,
            fail_save: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Store<Note> for FailingStore {
    async fn load(&self) -> Result<Vec<Note>, StoreError> {
        if self.fail_load {
            return Err(StoreError::Load("data file missing".into()));
        }
        Ok(self.seed.clone())
    }

    async fn save(&self, _items: &[Note]) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Save("disk full".into()));
        }
        Ok(())
    }
}
