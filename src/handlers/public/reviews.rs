use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::database::{Resource, Row};
use crate::error::ApiError;
use crate::handlers::utils;
use crate::middleware::{ApiResult, Reply};
use crate::state::AppState;

const RESOURCE: Resource = Resource::Review;

/// POST /reviews - one review per user per business
pub async fn create(State(state): State<AppState>, payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let review = utils::accept_body(RESOURCE, payload)?;

    if state.repository.count_reviews_by(&review).await? > 0 {
        return Err(ApiError::forbidden("User has already posted a review of this business"));
    }

    let id = state.repository.insert(RESOURCE, &review).await?;
    tracing::info!("Created review {}", id);
    Ok(Reply::Created(utils::created_body(RESOURCE, id, &review)))
}

/// GET /reviews/:reviewid
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Row> {
    Ok(Reply::Ok(utils::fetch(&state, RESOURCE, id).await?))
}

/// PUT /reviews/:reviewid
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let review = utils::accept_body(RESOURCE, payload)?;
    Ok(Reply::Ok(utils::replace(&state, RESOURCE, id, &review).await?))
}

/// DELETE /reviews/:reviewid
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    utils::remove(&state, RESOURCE, id).await?;
    Ok(Reply::NoContent)
}
