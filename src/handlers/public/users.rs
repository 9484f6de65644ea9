use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{hash_password, verify_password, SubjectId};
use crate::database::models::user::PASSWORD_FIELD;
use crate::database::Resource;
use crate::error::ApiError;
use crate::handlers::utils;
use crate::middleware::{ApiResult, Reply};
use crate::state::AppState;

const RESOURCE: Resource = Resource::User;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User id, as a number or a numeric string
    pub id: Option<Value>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /users - register a user; the password is stored as a bcrypt digest
pub async fn create(State(state): State<AppState>, payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let mut user = utils::accept_body(RESOURCE, payload)?;

    let password = match user.get(PASSWORD_FIELD) {
        Some(Value::String(p)) if !p.is_empty() => p.clone(),
        _ => {
            return Err(ApiError::validation_error(
                "Request body is not a valid user object",
                Some([(PASSWORD_FIELD.to_string(), "Must be a non-empty string".to_string())].into()),
            ))
        }
    };

    let cost = state.bcrypt_cost;
    let digest = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("Error inserting user into database")
        })??;
    user.replace(PASSWORD_FIELD, Value::String(digest));

    let id = state.repository.insert(RESOURCE, &user).await?;
    tracing::info!("Created user {}", id);
    Ok(Reply::Created(json!({ "id": id })))
}

/// POST /users/login - exchange an id and password for a bearer token
pub async fn login(State(state): State<AppState>, payload: Result<Json<LoginRequest>, JsonRejection>) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;

    let id = request.id.filter(is_present);
    let password = request.password.filter(|p| !p.is_empty());
    let (Some(id), Some(password)) = (id, password) else {
        return Err(ApiError::bad_request("Request body needs user id and password."));
    };

    let invalid = || ApiError::unauthorized("Invalid authentication credentials");

    let Some(subject) = SubjectId::from_json(&id) else {
        tracing::warn!("Login attempt with non-numeric user id {}", id);
        return Err(invalid());
    };

    let Some(digest) = state.repository.password_digest(subject).await? else {
        tracing::warn!("Login attempt for unknown user {}", subject);
        return Err(invalid());
    };

    let authenticated = tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("Error logging in. Try again later.")
        })?;

    if !authenticated {
        tracing::warn!("Failed login for user {}", subject);
        return Err(invalid());
    }

    let token = state.tokens.issue(subject)?;
    tracing::info!("Issued token for user {}", subject);
    Ok(Reply::Ok(LoginResponse { token }))
}

/// Null, false, zero and empty strings count as absent login fields
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
