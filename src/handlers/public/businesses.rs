use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::database::{Resource, Row};
use crate::handlers::utils;
use crate::middleware::{ApiResult, Reply};
use crate::pagination::{Page, PageQuery};
use crate::state::AppState;

const RESOURCE: Resource = Resource::Business;

/// GET /businesses?page=N - paginated list of businesses
pub async fn list(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Page<Row>> {
    let page = utils::list_page(&state, RESOURCE, &query).await?;
    Ok(Reply::Ok(page))
}

/// POST /businesses
pub async fn create(State(state): State<AppState>, payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let business = utils::accept_body(RESOURCE, payload)?;
    let id = state.repository.insert(RESOURCE, &business).await?;
    tracing::info!("Created business {}", id);
    Ok(Reply::Created(utils::created_body(RESOURCE, id, &business)))
}

/// GET /businesses/:businessid
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Row> {
    Ok(Reply::Ok(utils::fetch(&state, RESOURCE, id).await?))
}

/// PUT /businesses/:businessid - replace the business's fields
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let business = utils::accept_body(RESOURCE, payload)?;
    Ok(Reply::Ok(utils::replace(&state, RESOURCE, id, &business).await?))
}

/// DELETE /businesses/:businessid
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    utils::remove(&state, RESOURCE, id).await?;
    Ok(Reply::NoContent)
}
