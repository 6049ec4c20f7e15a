use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{require_optional_text, require_text, FieldError, Validate};
use crate::database::postgres::{PgDocument, PgQueryAs};
use crate::database::repository::Document;

pub const DEFAULT_STATUS: &str = "active";

/// An IoT node: a device on a farm that carries sensors
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct IotNode {
    pub id: Uuid,
    pub name: String,
    pub status: Vec<String>,
    pub farm: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accepts `"x"` as well as `["x", "y"]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IotInput {
    pub name: String,
    #[serde(default)]
    pub status: Option<OneOrMany<String>>,
    pub farm: Uuid,
}

impl IotInput {
    pub fn new(name: &str, farm: Uuid) -> Self {
        Self {
            name: name.to_string(),
            status: None,
            farm,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IotPatch {
    pub name: Option<String>,
    pub status: Option<OneOrMany<String>>,
    pub farm: Option<Uuid>,
}

fn check_status(status: Option<&OneOrMany<String>>) -> Result<(), FieldError> {
    let blank = match status {
        Some(OneOrMany::One(s)) => s.trim().is_empty(),
        Some(OneOrMany::Many(list)) => list.iter().any(|s| s.trim().is_empty()),
        None => false,
    };
    if blank {
        return Err(FieldError::new("status", "entries must not be blank"));
    }
    Ok(())
}

impl Validate for IotInput {
    fn validate(&self) -> Result<(), FieldError> {
        require_text("name", &self.name)?;
        check_status(self.status.as_ref())
    }
}

impl Validate for IotPatch {
    fn validate(&self) -> Result<(), FieldError> {
        require_optional_text("name", self.name.as_deref())?;
        // Create falls back to the default status; a patch must name one
        if matches!(&self.status, Some(OneOrMany::Many(list)) if list.is_empty()) {
            return Err(FieldError::new("status", "must not be empty"));
        }
        check_status(self.status.as_ref())
    }
}

impl Document for IotNode {
    type Create = IotInput;
    type Patch = IotPatch;

    const COLLECTION: &'static str = "iot_nodes";
    const LABEL: &'static str = "Iot";
    const PARENT_FIELD: Option<&'static str> = Some("farm");

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.farm)
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: IotInput) -> Self {
        let mut status = input.status.map(OneOrMany::into_vec).unwrap_or_default();
        if status.is_empty() {
            status.push(DEFAULT_STATUS.to_string());
        }
        Self {
            id,
            name: input.name.trim().to_string(),
            status,
            farm: input.farm,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: IotPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.status = status.into_vec();
        }
        if let Some(farm) = patch.farm {
            self.farm = farm;
        }
        self.updated_at = now;
    }
}

impl PgDocument for IotNode {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "status", "farm", "created_at", "updated_at"];

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.id)
            .bind(self.name.clone())
            .bind(self.status.clone())
            .bind(self.farm)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}
