use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{require_optional_text, require_text, FieldError, Validate};
use crate::database::postgres::{PgDocument, PgQueryAs};
use crate::database::repository::Document;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Sensor {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub measurement_unit: Option<String>,
    pub iot: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorInput {
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    #[serde(default)]
    pub measurement_unit: Option<String>,
    #[serde(alias = "Iot")]
    pub iot: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    pub measurement_unit: Option<String>,
    #[serde(alias = "Iot")]
    pub iot: Option<Uuid>,
}

impl Validate for SensorInput {
    fn validate(&self) -> Result<(), FieldError> {
        require_text("name", &self.name)?;
        require_text("type", &self.sensor_type)
    }
}

impl Validate for SensorPatch {
    fn validate(&self) -> Result<(), FieldError> {
        require_optional_text("name", self.name.as_deref())?;
        require_optional_text("type", self.sensor_type.as_deref())
    }
}

impl Document for Sensor {
    type Create = SensorInput;
    type Patch = SensorPatch;

    const COLLECTION: &'static str = "sensors";
    const LABEL: &'static str = "Sensor";
    const PARENT_FIELD: Option<&'static str> = Some("iot");

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.iot)
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: SensorInput) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            sensor_type: input.sensor_type.trim().to_string(),
            measurement_unit: input.measurement_unit,
            iot: input.iot,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: SensorPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(sensor_type) = patch.sensor_type {
            self.sensor_type = sensor_type.trim().to_string();
        }
        if let Some(unit) = patch.measurement_unit {
            self.measurement_unit = Some(unit);
        }
        if let Some(iot) = patch.iot {
            self.iot = iot;
        }
        self.updated_at = now;
    }
}

impl PgDocument for Sensor {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "sensor_type",
        "measurement_unit",
        "iot",
        "created_at",
        "updated_at",
    ];

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.id)
            .bind(self.name.clone())
            .bind(self.sensor_type.clone())
            .bind(self.measurement_unit.clone())
            .bind(self.iot)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}
