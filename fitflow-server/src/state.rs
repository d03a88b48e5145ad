//! Application state shared by all handlers

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::{DbService, RepoResult};
use crate::email::Mailer;

#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtService>,
    /// Mock mailer for gym credentials
    pub mailer: Mailer,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Open the configured database (running migrations) and build the state
    pub async fn new(config: Config) -> RepoResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self::with_pool(db.pool, config))
    }

    pub fn with_pool(pool: SqlitePool, config: Config) -> Self {
        let jwt = JwtService::with_config(config.jwt.clone());
        let mailer = Mailer::new(config.email_from.clone(), config.frontend_url.clone());
        Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            mailer,
            rate_limiter: RateLimiter::new(),
        }
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt
    }
}
