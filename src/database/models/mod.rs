pub mod farm;
pub mod iot;
pub mod reading;
pub mod sensor;
pub mod user;

pub use farm::{Farm, FarmInput, FarmPatch};
pub use iot::{IotInput, IotNode, IotPatch, OneOrMany};
pub use reading::{Reading, ReadingBatch, ReadingInput, ScalarValue};
pub use sensor::{Sensor, SensorInput, SensorPatch};
pub use user::{
    Group, GroupInput, GroupPatch, LoginInput, NewUser, Permission, PermissionInput, RegisterInput,
    User, UserPatch,
};
pub use user::normalize_email;

use thiserror::Error;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }
}

/// Presence and shape checks run on request bodies before they reach the store
pub trait Validate {
    fn validate(&self) -> Result<(), FieldError> {
        Ok(())
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::required(field));
    }
    Ok(())
}

pub(crate) fn require_optional_text(field: &str, value: Option<&str>) -> Result<(), FieldError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}
