use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::repository::{Collection, Document};

/// Process-local collection, used by tests and `STORE_BACKEND=memory`
pub struct MemoryCollection<T> {
    records: RwLock<Vec<T>>,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Document> MemoryCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(records: &[T], candidate: &T) -> Result<(), DatabaseError> {
        let (Some(field), Some(key)) = (T::UNIQUE_FIELD, candidate.unique_key()) else {
            return Ok(());
        };
        let taken = records
            .iter()
            .any(|r| r.id() != candidate.id() && r.unique_key() == Some(key));
        if taken {
            return Err(DatabaseError::Duplicate { label: T::LABEL, field });
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Document> Collection<T> for MemoryCollection<T> {
    async fn create(&self, input: T::Create) -> Result<T, DatabaseError> {
        let doc = T::from_create(Uuid::new_v4(), Utc::now(), input);
        let mut records = self.records.write().await;
        Self::check_unique(&records, &doc)?;
        records.push(doc.clone());
        Ok(doc)
    }

    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<T>, DatabaseError> {
        let records = self.records.read().await;
        Ok(match parent {
            None => records.clone(),
            Some(parent) => records
                .iter()
                .filter(|r| r.parent_id() == Some(parent))
                .cloned()
                .collect(),
        })
    }

    async fn list_by_parents(&self, parents: &[Uuid]) -> Result<Vec<T>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.parent_id().is_some_and(|p| parents.contains(&p)))
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<T, DatabaseError> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(DatabaseError::NotFound(T::LABEL))
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<T>, DatabaseError> {
        if T::UNIQUE_FIELD.is_none() {
            return Ok(None);
        }
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.unique_key() == Some(key)).cloned())
    }

    async fn update(&self, id: Uuid, patch: T::Patch) -> Result<T, DatabaseError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(DatabaseError::NotFound(T::LABEL))?;

        let mut doc = records[index].clone();
        doc.apply_patch(patch, Utc::now());
        Self::check_unique(&records, &doc)?;
        records[index] = doc.clone();
        Ok(doc)
    }

    async fn delete(&self, id: Uuid) -> Result<T, DatabaseError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(DatabaseError::NotFound(T::LABEL))?;
        Ok(records.remove(index))
    }
}
