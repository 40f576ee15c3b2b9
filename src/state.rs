//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::services::{
    mailer_from_config, AuthService, FileStorage, ImageUploader, Mailer, TotpService,
};
use crate::utils::errors::AppResult;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    pub auth: AuthService,
    pub images: ImageUploader,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> AppResult<Self> {
        let mailer = mailer_from_config(&config);
        Self::with_mailer(pool, config, mailer)
    }

    pub fn with_mailer(
        pool: PgPool,
        config: EnvironmentConfig,
        mailer: Arc<dyn Mailer>,
    ) -> AppResult<Self> {
        let jwt = JwtConfig::from(&config);
        let auth = AuthService::new(
            jwt.clone(),
            TotpService::new(config.totp_issuer.clone()),
            mailer,
            config.frontend_url.clone(),
        );
        let images = ImageUploader::new(
            config.cloudinary.clone(),
            FileStorage::new(config.upload_dir.clone()),
        )?;
        let rate_limit = RateLimitState::new(&config);

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt,
            auth,
            images,
            rate_limit,
        })
    }
}
