use std::sync::Arc;

use chrono::Duration;

use crate::auth::TokenService;
use crate::config::{AppConfig, ConfigError};
use crate::database::{Repository, Resource};
use crate::pagination::{PageSize, Paginator};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub tokens: Arc<TokenService>,
    pub page_size: PageSize,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, tokens: TokenService, page_size: PageSize, bcrypt_cost: u32) -> Self {
        Self {
            repository,
            tokens: Arc::new(tokens),
            page_size,
            bcrypt_cost,
        }
    }

    /// Build state from validated configuration
    pub fn from_config(config: &AppConfig, repository: Arc<dyn Repository>) -> Result<Self, ConfigError> {
        config.validate()?;

        let validity = i64::try_from(config.security.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or(ConfigError::InvalidJwtExpiry)?;
        let tokens = TokenService::new(config.security.jwt_secret.as_bytes(), validity)
            .map_err(|_| ConfigError::MissingJwtSecret)?;
        let page_size = PageSize::new(config.api.page_size).map_err(|_| ConfigError::InvalidPageSize(config.api.page_size))?;

        Ok(Self::new(repository, tokens, page_size, config.security.bcrypt_cost))
    }

    pub fn paginator(&self, resource: Resource) -> Paginator {
        Paginator::new(resource.path(), self.page_size)
    }
}
