use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::auth::SubjectId;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{user::PASSWORD_FIELD, Resource};
use crate::database::repository::{Repository, Row};
use crate::validation::ValidatedRecord;

/// [`Repository`] over PostgreSQL.
///
/// Values are bound as a single JSONB document and expanded with
/// `jsonb_populate_record`, so Postgres coerces them to the column types and the
/// column list comes from the validated keys alone.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn table(resource: Resource) -> String {
        DatabaseManager::quote_identifier(resource.table())
    }

    fn columns(record: &ValidatedRecord) -> Vec<String> {
        record.keys().map(DatabaseManager::quote_identifier).collect()
    }

    async fn fetch_rows(&self, query: &str, bind: Option<i64>) -> Result<Vec<Row>, DatabaseError> {
        let mut q = sqlx::query_scalar::<_, Value>(query);
        if let Some(v) = bind {
            q = q.bind(v);
        }
        let values = q.fetch_all(&self.pool).await?;
        values.into_iter().map(into_row).collect()
    }
}

fn into_row(value: Value) -> Result<Row, DatabaseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("expected a JSON row, got {}", other))),
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn insert(&self, resource: Resource, record: &ValidatedRecord) -> Result<i64, DatabaseError> {
        let table = Self::table(resource);
        let columns = Self::columns(record).join(", ");
        let query = format!(
            "INSERT INTO {table} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) RETURNING id::bigint"
        );

        let id = sqlx::query_scalar::<_, i64>(&query)
            .bind(record.to_json())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Inserted {} row {}", resource.table(), id);
        Ok(id)
    }

    async fn find_by_id(&self, resource: Resource, id: i64) -> Result<Option<Row>, DatabaseError> {
        let query = format!("SELECT row_to_json(t)::jsonb FROM {} t WHERE t.id = $1", Self::table(resource));
        Ok(self.fetch_rows(&query, Some(id)).await?.into_iter().next())
    }

    async fn update_by_id(&self, resource: Resource, id: i64, record: &ValidatedRecord) -> Result<bool, DatabaseError> {
        let table = Self::table(resource);

        if record.is_empty() {
            let query = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)");
            let exists = sqlx::query_scalar::<_, bool>(&query).bind(id).fetch_one(&self.pool).await?;
            return Ok(exists);
        }

        let assignments = Self::columns(record)
            .iter()
            .map(|c| format!("{c} = r.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "UPDATE {table} AS t SET {assignments} FROM jsonb_populate_record(NULL::{table}, $1) AS r WHERE t.id = $2"
        );

        let result = sqlx::query(&query)
            .bind(record.to_json())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, resource: Resource, id: i64) -> Result<bool, DatabaseError> {
        let query = format!("DELETE FROM {} WHERE id = $1", Self::table(resource));
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, resource: Resource) -> Result<Vec<Row>, DatabaseError> {
        let query = format!("SELECT row_to_json(t)::jsonb FROM {} t ORDER BY t.id", Self::table(resource));
        self.fetch_rows(&query, None).await
    }

    async fn count(&self, resource: Resource) -> Result<i64, DatabaseError> {
        let query = format!("SELECT COUNT(*) FROM {}", Self::table(resource));
        Ok(sqlx::query_scalar::<_, i64>(&query).fetch_one(&self.pool).await?)
    }

    async fn list_by_owner(&self, resource: Resource, owner: SubjectId) -> Result<Vec<Row>, DatabaseError> {
        let Some(column) = resource.owner_column() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT row_to_json(t)::jsonb FROM {} t WHERE t.{} = $1 ORDER BY t.id",
            Self::table(resource),
            DatabaseManager::quote_identifier(column)
        );
        self.fetch_rows(&query, Some(owner.get())).await
    }

    async fn count_reviews_by(&self, review: &ValidatedRecord) -> Result<i64, DatabaseError> {
        let table = Self::table(Resource::Review);
        let query = format!(
            "SELECT COUNT(*) FROM {table} t, jsonb_populate_record(NULL::{table}, $1) r \
             WHERE t.userid = r.userid AND t.businessid = r.businessid"
        );
        Ok(sqlx::query_scalar::<_, i64>(&query)
            .bind(review.to_json())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn password_digest(&self, user: SubjectId) -> Result<Option<String>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1",
            DatabaseManager::quote_identifier(PASSWORD_FIELD),
            Self::table(Resource::User)
        );
        Ok(sqlx::query_scalar::<_, String>(&query)
            .bind(user.get())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
