use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::auth::SubjectId;
use crate::database::manager::DatabaseError;
use crate::database::models::Resource;
use crate::validation::ValidatedRecord;

/// A stored row, as a JSON object keyed by column name
pub type Row = Map<String, Value>;

/// Storage collaborator behind every handler.
///
/// Writes only ever take a [`ValidatedRecord`], so columns written are always
/// drawn from the resource's schema.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Insert a row and return its generated id
    async fn insert(&self, resource: Resource, record: &ValidatedRecord) -> Result<i64, DatabaseError>;

    async fn find_by_id(&self, resource: Resource, id: i64) -> Result<Option<Row>, DatabaseError>;

    /// Returns false when no row has `id`
    async fn update_by_id(&self, resource: Resource, id: i64, record: &ValidatedRecord) -> Result<bool, DatabaseError>;

    /// Returns false when no row has `id`
    async fn delete_by_id(&self, resource: Resource, id: i64) -> Result<bool, DatabaseError>;

    /// Every row of the collection, ordered by id
    async fn list(&self, resource: Resource) -> Result<Vec<Row>, DatabaseError>;

    async fn count(&self, resource: Resource) -> Result<i64, DatabaseError>;

    /// Rows whose owner column equals `owner`. Empty for resources without one.
    async fn list_by_owner(&self, resource: Resource, owner: SubjectId) -> Result<Vec<Row>, DatabaseError>;

    /// Number of reviews already posted by `review`'s user for its business
    async fn count_reviews_by(&self, review: &ValidatedRecord) -> Result<i64, DatabaseError>;

    /// Stored password digest for a user, if the user exists
    async fn password_digest(&self, user: SubjectId) -> Result<Option<String>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
