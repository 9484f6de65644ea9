//! Shared create/read/update/delete steps. Resource handlers differ only in the
//! [`Resource`] they pass and in the links they return.

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::{json, Map, Value};

use crate::database::{Resource, Row};
use crate::error::ApiError;
use crate::pagination::{Page, PageQuery};
use crate::state::AppState;
use crate::validation::ValidatedRecord;

/// Parse the body and run it through the resource schema.
pub fn accept_body(resource: Resource, payload: Result<Json<Value>, JsonRejection>) -> Result<ValidatedRecord, ApiError> {
    let Json(body) = payload?;
    Ok(resource.schema().accept(&body)?)
}

pub async fn list_page(state: &AppState, resource: Resource, query: &PageQuery) -> Result<Page<Row>, ApiError> {
    let rows = state.repository.list(resource).await?;
    let count = state.repository.count(resource).await?;
    let total_count = usize::try_from(count).unwrap_or(rows.len());
    Ok(state.paginator(resource).paginate_counted(rows, total_count, query.requested_page()))
}

pub async fn fetch(state: &AppState, resource: Resource, id: i64) -> Result<Row, ApiError> {
    state
        .repository
        .find_by_id(resource, id)
        .await?
        .ok_or_else(|| not_found(resource, id))
}

pub async fn replace(state: &AppState, resource: Resource, id: i64, record: &ValidatedRecord) -> Result<Value, ApiError> {
    if !state.repository.update_by_id(resource, id, record).await? {
        return Err(not_found(resource, id));
    }
    tracing::debug!("Updated {} {}", resource.table(), id);
    let mut links = Map::new();
    links.insert(resource.schema().name().to_string(), Value::String(resource.link(id)));
    Ok(json!({ "id": id, "links": links }))
}

pub async fn remove(state: &AppState, resource: Resource, id: i64) -> Result<(), ApiError> {
    if !state.repository.delete_by_id(resource, id).await? {
        return Err(not_found(resource, id));
    }
    tracing::debug!("Deleted {} {}", resource.table(), id);
    Ok(())
}

/// `{ id, links: { <resource>: ..., business: ... } }` for a freshly created row.
/// The business link is added when the record references one.
pub fn created_body(resource: Resource, id: i64, record: &ValidatedRecord) -> Value {
    let mut links = Map::new();
    links.insert(resource.schema().name().to_string(), Value::String(resource.link(id)));
    if resource != Resource::Business {
        if let Some(business) = record.get("businessid") {
            links.insert(
                Resource::Business.schema().name().to_string(),
                Value::String(format!("{}/{}", Resource::Business.path(), id_segment(business))),
            );
        }
    }
    json!({ "id": id, "links": links })
}

/// Render an id value as a path segment without JSON string quotes
pub fn id_segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn not_found(resource: Resource, id: i64) -> ApiError {
    ApiError::not_found(format!("No {} with id {}", resource.schema().name(), id))
}
