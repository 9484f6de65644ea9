// Owner-scoped user endpoints. The bearer token has already been verified by
// the auth middleware; every handler checks ownership before touching storage.
use axum::extract::{Extension, Path, State};
use serde_json::{Map, Value};

use crate::auth::authorize;
use crate::database::models::user;
use crate::database::{Resource, Row};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthenticatedSubject, Reply};
use crate::state::AppState;

/// GET /users/:userid - the user's own record, without the password digest
pub async fn get(
    State(state): State<AppState>,
    Extension(AuthenticatedSubject(subject)): Extension<AuthenticatedSubject>,
    Path(owner): Path<String>,
) -> ApiResult<Row> {
    authorize(subject, &owner)?;

    let row = state
        .repository
        .find_by_id(Resource::User, subject.get())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No user with id {}", subject)))?;

    Ok(Reply::Ok(user::redact(row)))
}

/// GET /users/:userid/businesses
pub async fn businesses(
    state: State<AppState>,
    subject: Extension<AuthenticatedSubject>,
    owner: Path<String>,
) -> ApiResult<Value> {
    owned(state, subject, owner, Resource::Business).await
}

/// GET /users/:userid/reviews
pub async fn reviews(
    state: State<AppState>,
    subject: Extension<AuthenticatedSubject>,
    owner: Path<String>,
) -> ApiResult<Value> {
    owned(state, subject, owner, Resource::Review).await
}

/// GET /users/:userid/photos
pub async fn photos(
    state: State<AppState>,
    subject: Extension<AuthenticatedSubject>,
    owner: Path<String>,
) -> ApiResult<Value> {
    owned(state, subject, owner, Resource::Photo).await
}

async fn owned(
    State(state): State<AppState>,
    Extension(AuthenticatedSubject(subject)): Extension<AuthenticatedSubject>,
    Path(owner): Path<String>,
    resource: Resource,
) -> ApiResult<Value> {
    authorize(subject, &owner)?;

    let rows = state.repository.list_by_owner(resource, subject).await?;
    let items = rows.into_iter().map(Value::Object).collect();

    let mut body = Map::new();
    body.insert(resource.table().to_string(), Value::Array(items));
    Ok(Reply::Ok(Value::Object(body)))
}
