use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::convert::Infallible;
use uuid::Uuid;

use super::{FieldError, Validate};
use crate::database::postgres::{PgDocument, PgQueryAs};
use crate::database::repository::Document;

/// One measured value. Readings are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Reading {
    pub id: Uuid,
    pub sensor: Uuid,
    pub value: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Devices report text, numbers or booleans; all are stored as text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Text(s) => write!(f, "{}", s),
            ScalarValue::Number(n) => write!(f, "{}", n),
            ScalarValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadingInput {
    pub sensor: Uuid,
    pub value: ScalarValue,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReadingInput {
    pub fn new(sensor: Uuid, value: impl Into<String>) -> Self {
        Self {
            sensor,
            value: ScalarValue::Text(value.into()),
            timestamp: None,
        }
    }
}

/// Body of `POST /readings`
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ReadingBatch(pub Vec<ReadingInput>);

impl ReadingBatch {
    pub fn into_inner(self) -> Vec<ReadingInput> {
        self.0
    }
}

impl Validate for ReadingBatch {
    fn validate(&self) -> Result<(), FieldError> {
        if self.0.is_empty() {
            return Err(FieldError::new("readings", "at least one reading is required"));
        }
        for (i, entry) in self.0.iter().enumerate() {
            if matches!(&entry.value, ScalarValue::Text(s) if s.trim().is_empty()) {
                return Err(FieldError::required(format!("[{}].value", i)));
            }
        }
        Ok(())
    }
}

impl Document for Reading {
    type Create = ReadingInput;
    type Patch = Infallible;

    const COLLECTION: &'static str = "readings";
    const LABEL: &'static str = "Reading";
    const PARENT_FIELD: Option<&'static str> = Some("sensor");

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.sensor)
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: ReadingInput) -> Self {
        Self {
            id,
            sensor: input.sensor,
            value: input.value.to_string(),
            timestamp: input.timestamp.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: Infallible, _now: DateTime<Utc>) {
        match patch {}
    }
}

impl PgDocument for Reading {
    const COLUMNS: &'static [&'static str] =
        &["id", "sensor", "value", "timestamp", "created_at", "updated_at"];

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.id)
            .bind(self.sensor)
            .bind(self.value.clone())
            .bind(self.timestamp)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}
