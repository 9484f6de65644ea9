use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod guard;
pub mod password;

pub use guard::{authorize, is_authorized, AuthorizationError};
pub use password::{hash_password, verify_password, PasswordError};

/// Identifier of an authenticated user. Tokens carry it as the `sub` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(i64);

impl SubjectId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Normalize a JSON identifier: integers and integer-valued strings are accepted.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubjectId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<i64> for SubjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Fails when `issued_at + validity` is not a representable instant.
    pub fn new(subject: SubjectId, issued_at: DateTime<Utc>, validity: Duration) -> Result<Self, JwtError> {
        let expires_at = issued_at.checked_add_signed(validity).ok_or(JwtError::ExpiryOutOfRange)?;
        Ok(Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }
}

/// Why a presented token was not accepted. Callers must not echo the variant
/// back to clients; it is for logging only.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT expiry is out of range")]
    ExpiryOutOfRange,
}

/// Issues and verifies HS256 tokens with one secret for the lifetime of the
/// instance. Holds no mutable state; share it behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

    pub fn new(secret: &[u8], validity: Duration) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity,
        })
    }

    pub fn with_default_validity(secret: &[u8]) -> Result<Self, JwtError> {
        Self::new(secret, Duration::hours(Self::DEFAULT_VALIDITY_HOURS))
    }

    pub fn issue(&self, subject: SubjectId) -> Result<String, JwtError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if at `issued_at`. Expiry is `issued_at + validity`.
    pub fn issue_at(&self, subject: SubjectId, issued_at: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims::new(subject, issued_at, self.validity)?;
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<SubjectId, TokenRejection> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and payload, rejecting once `now >= exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SubjectId, TokenRejection> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below without leeway
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            _ => TokenRejection::Malformed,
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenRejection::Expired);
        }

        data.claims.sub.parse().map_err(|_| TokenRejection::Malformed)
    }
}
