use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// Successful handler outcome. Bodies are sent bare, without an envelope:
/// a row, a page descriptor, or `{ id, links }`.
#[derive(Debug)]
pub enum Reply<T> {
    Ok(T),
    Created(T),
    /// Deletions answer 204 with no body
    NoContent,
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self {
            Reply::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Reply::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Reply::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

pub type ApiResult<T> = Result<Reply<T>, ApiError>;
