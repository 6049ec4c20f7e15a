use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{require_optional_text, require_text, FieldError, Validate};
use crate::database::postgres::{PgDocument, PgQueryAs};
use crate::database::repository::Document;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Farm {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub owner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmInput {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub owner: Option<Uuid>,
}

impl Validate for FarmInput {
    fn validate(&self) -> Result<(), FieldError> {
        require_text("name", &self.name)
    }
}

impl Validate for FarmPatch {
    fn validate(&self) -> Result<(), FieldError> {
        require_optional_text("name", self.name.as_deref())
    }
}

impl Document for Farm {
    type Create = FarmInput;
    type Patch = FarmPatch;

    const COLLECTION: &'static str = "farms";
    const LABEL: &'static str = "Farm";
    const PARENT_FIELD: Option<&'static str> = Some("owner");
    const UNIQUE_FIELD: Option<&'static str> = Some("name");

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.owner
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: FarmInput) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            location: input.location,
            description: input.description,
            owner: input.owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: FarmPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(owner) = patch.owner {
            self.owner = Some(owner);
        }
        self.updated_at = now;
    }
}

impl PgDocument for Farm {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "location",
        "description",
        "owner",
        "created_at",
        "updated_at",
    ];

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.id)
            .bind(self.name.clone())
            .bind(self.location.clone())
            .bind(self.description.clone())
            .bind(self.owner)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}
