use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::SubjectId;
use crate::error::ApiError;
use crate::state::AppState;

/// Subject recovered from a verified bearer token, valid for one request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedSubject(pub SubjectId);

/// JWT authentication middleware that verifies the bearer token and injects the subject
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::warn!("Authentication failed: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    // Validate and decode JWT
    let subject = state.tokens.verify(token)?;

    tracing::debug!("Authenticated subject {}", subject);
    request.extensions_mut().insert(AuthenticatedSubject(subject));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
