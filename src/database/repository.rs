use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// A record type stored in its own collection.
///
/// Parent references are plain ids. Nothing checks that the parent exists
/// and deleting a parent leaves its children in place (soft orphaning).
pub trait Document: Clone + Serialize + Send + Sync + Unpin + 'static {
    /// Fields accepted on create
    type Create: Send + 'static;
    /// Partial update; `None` fields are left untouched
    type Patch: Send + 'static;

    /// Collection (table) name
    const COLLECTION: &'static str;
    /// Human readable record type, used in error messages
    const LABEL: &'static str;
    /// Field holding the parent reference
    const PARENT_FIELD: Option<&'static str> = None;
    /// Field that must be unique across the collection
    const UNIQUE_FIELD: Option<&'static str> = None;

    fn id(&self) -> Uuid;

    fn parent_id(&self) -> Option<Uuid> {
        None
    }

    fn unique_key(&self) -> Option<&str> {
        None
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: Self::Create) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);
}

/// CRUD surface shared by every store backend
#[async_trait]
pub trait Collection<T: Document>: Send + Sync {
    async fn create(&self, input: T::Create) -> Result<T, DatabaseError>;

    /// Insert entries one by one. Each insert is atomic on its own; the
    /// batch is not, and it stops at the first failure.
    async fn create_many(&self, inputs: Vec<T::Create>) -> Result<Vec<T>, DatabaseError> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(self.create(input).await?);
        }
        Ok(created)
    }

    /// All records, or only those whose parent reference equals `parent`
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<T>, DatabaseError>;

    async fn list_by_parents(&self, parents: &[Uuid]) -> Result<Vec<T>, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<T, DatabaseError>;

    /// Lookup by the collection's unique field
    async fn find_by_key(&self, key: &str) -> Result<Option<T>, DatabaseError>;

    async fn update(&self, id: Uuid, patch: T::Patch) -> Result<T, DatabaseError>;

    /// Remove a record and return it. Children are not touched.
    async fn delete(&self, id: Uuid) -> Result<T, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Bucket records by their parent reference, preserving order
pub fn group_by_parent<T: Document>(records: Vec<T>) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for record in records {
        if let Some(parent) = record.parent_id() {
            grouped.entry(parent).or_default().push(record);
        }
    }
    grouped
}
