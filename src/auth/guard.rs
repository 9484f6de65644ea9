//! Owner-scoped access checks.
//!
//! The owner id arrives as a raw path segment while the subject comes out of a
//! verified token, so both sides are normalized to [`SubjectId`] before they are
//! compared. An owner segment that is not an integer never matches.

use thiserror::Error;

use super::SubjectId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unauthorized to access the specified resource")]
pub struct AuthorizationError {
    pub subject: SubjectId,
    pub owner: String,
}

pub fn is_authorized(subject: SubjectId, owner: &str) -> bool {
    owner.parse::<SubjectId>().map_or(false, |owner| owner == subject)
}

pub fn authorize(subject: SubjectId, owner: &str) -> Result<(), AuthorizationError> {
    if is_authorized(subject, owner) {
        tracing::debug!("Subject {} authorized for owner '{}'", subject, owner);
        Ok(())
    } else {
        tracing::warn!("Subject {} denied access to resources of owner '{}'", subject, owner);
        Err(AuthorizationError { subject, owner: owner.to_string() })
    }
}
