pub mod auth;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthenticatedSubject};
pub use response::{ApiResult, Reply};
