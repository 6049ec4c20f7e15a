// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth, mounted under /user)

pub mod protected;
pub mod public;

use serde::Deserialize;
use uuid::Uuid;

use crate::database::Document;
use crate::error::ApiError;

/// Path id for a record of type `T`. A value that is not a UUID cannot name
/// any record, so it is reported the same way as an unknown id.
pub fn parse_id<T: Document>(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", T::LABEL)))
}

/// Optional parent-reference filter from the query string
pub fn parse_filter(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| ApiError::field(field, "must be a UUID")),
    }
}

/// Query string shared by list and detail routes
#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    pub owner: Option<String>,
    pub farm: Option<String>,
    pub iot: Option<String>,
    pub sensor: Option<String>,
    /// `?expand=false` returns bare records; expansion is on by default
    pub expand: Option<String>,
}

impl RecordQuery {
    pub fn expand(&self) -> bool {
        !matches!(
            self.expand.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("false" | "0" | "no" | "off")
        )
    }
}
