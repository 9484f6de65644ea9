use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::database::{Resource, Row};
use crate::handlers::utils;
use crate::middleware::{ApiResult, Reply};
use crate::state::AppState;

const RESOURCE: Resource = Resource::Photo;

/// POST /photos
pub async fn create(State(state): State<AppState>, payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let photo = utils::accept_body(RESOURCE, payload)?;
    let id = state.repository.insert(RESOURCE, &photo).await?;
    tracing::info!("Created photo {}", id);
    Ok(Reply::Created(utils::created_body(RESOURCE, id, &photo)))
}

/// GET /photos/:photoid
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Row> {
    Ok(Reply::Ok(utils::fetch(&state, RESOURCE, id).await?))
}

/// PUT /photos/:photoid
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let photo = utils::accept_body(RESOURCE, payload)?;
    Ok(Reply::Ok(utils::replace(&state, RESOURCE, id, &photo).await?))
}

/// DELETE /photos/:photoid
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    utils::remove(&state, RESOURCE, id).await?;
    Ok(Reply::NoContent)
}
