use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, PgPool, Postgres,
};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::repository::{Collection, Document};

pub type PgQueryAs<'q, T> = QueryAs<'q, Postgres, T, PgArguments>;

/// Row mapping for a document stored in its own table
pub trait PgDocument: Document + for<'r> FromRow<'r, PgRow> {
    /// Column names in bind order; `id` comes first
    const COLUMNS: &'static [&'static str];

    /// Bind every column of `COLUMNS`, in order
    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self>;
}

/// Table-backed collection
pub struct PgCollection<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: PgDocument> PgCollection<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    fn insert_sql() -> String {
        let columns = T::COLUMNS
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let params = (1..=T::COLUMNS.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            quote_identifier(T::COLLECTION),
            columns,
            params
        )
    }

    fn update_sql() -> String {
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| format!("{} = ${}", quote_identifier(c), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {} WHERE \"id\" = $1 RETURNING *",
            quote_identifier(T::COLLECTION),
            assignments
        )
    }

    fn select_sql(condition: Option<String>) -> String {
        let mut sql = format!("SELECT * FROM {}", quote_identifier(T::COLLECTION));
        if let Some(condition) = condition {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }
        sql.push_str(" ORDER BY \"created_at\", \"id\"");
        sql
    }

    /// Map unique violations to `Duplicate`; everything else passes through
    fn write_error(err: sqlx::Error) -> DatabaseError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::Duplicate {
                    label: T::LABEL,
                    field: T::UNIQUE_FIELD.unwrap_or("id"),
                };
            }
        }
        err.into()
    }
}

#[async_trait]
impl<T: PgDocument> Collection<T> for PgCollection<T> {
    async fn create(&self, input: T::Create) -> Result<T, DatabaseError> {
        let doc = T::from_create(Uuid::new_v4(), Utc::now(), input);
        let sql = Self::insert_sql();
        let row = doc
            .bind_columns(sqlx::query_as::<_, T>(&sql))
            .fetch_one(&self.pool)
            .await
            .map_err(Self::write_error)?;
        tracing::debug!("Inserted {} {}", T::LABEL, row.id());
        Ok(row)
    }

    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<T>, DatabaseError> {
        match (parent, T::PARENT_FIELD) {
            (None, _) => {
                let sql = Self::select_sql(None);
                Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
            }
            (Some(parent), Some(field)) => {
                let sql = Self::select_sql(Some(format!("{} = $1", quote_identifier(field))));
                Ok(sqlx::query_as::<_, T>(&sql)
                    .bind(parent)
                    .fetch_all(&self.pool)
                    .await?)
            }
            (Some(_), None) => Ok(vec![]),
        }
    }

    async fn list_by_parents(&self, parents: &[Uuid]) -> Result<Vec<T>, DatabaseError> {
        let Some(field) = T::PARENT_FIELD else {
            return Ok(vec![]);
        };
        if parents.is_empty() {
            return Ok(vec![]);
        }
        let sql = Self::select_sql(Some(format!("{} = ANY($1)", quote_identifier(field))));
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(parents.to_vec())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get(&self, id: Uuid) -> Result<T, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE \"id\" = $1", quote_identifier(T::COLLECTION));
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound(T::LABEL))
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<T>, DatabaseError> {
        let Some(field) = T::UNIQUE_FIELD else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1",
            quote_identifier(T::COLLECTION),
            quote_identifier(field)
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update(&self, id: Uuid, patch: T::Patch) -> Result<T, DatabaseError> {
        // Read-merge-write; concurrent writers are last-writer-wins
        let mut doc = self.get(id).await?;
        doc.apply_patch(patch, Utc::now());

        let sql = Self::update_sql();
        doc.bind_columns(sqlx::query_as::<_, T>(&sql))
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::write_error)?
            .ok_or(DatabaseError::NotFound(T::LABEL))
    }

    async fn delete(&self, id: Uuid) -> Result<T, DatabaseError> {
        let sql = format!(
            "DELETE FROM {} WHERE \"id\" = $1 RETURNING *",
            quote_identifier(T::COLLECTION)
        );
        let deleted = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound(T::LABEL))?;
        tracing::debug!("Deleted {} {}", T::LABEL, id);
        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
