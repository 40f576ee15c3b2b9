//! Servicio de autenticación
//!
//! Alta, login con o sin segundo factor y recuperación de contraseña.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;

use crate::dto::auth_dto::{
    SignUpRequest, SignUpResponse, TokenResponse, TotpChallenge, TotpSetupResponse,
};
use crate::models::{auth::Role, notification::NotificationType, user::User};
use crate::repositories::{NotificationStore, UserStore};
use crate::services::{
    email_service::Mailer, notification_service::notify, totp_service::TotpService, user_service,
};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

const RESET_TOKEN_LENGTH: usize = 48;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Resultado de `signin`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SignInOutcome {
    Authenticated(TokenResponse),
    TotpRequired(TotpChallenge),
}

#[derive(Clone)]
pub struct AuthService {
    jwt: JwtConfig,
    totp: TotpService,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

impl AuthService {
    pub fn new(
        jwt: JwtConfig,
        totp: TotpService,
        mailer: Arc<dyn Mailer>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            jwt,
            totp,
            mailer,
            frontend_url: frontend_url.into(),
        }
    }

    pub fn totp(&self) -> &TotpService {
        &self.totp
    }

    fn issue_token(&self, user: User) -> AppResult<TokenResponse> {
        let token = generate_token(&user, &self.jwt)?;
        Ok(TokenResponse {
            token,
            token_type: "Bearer",
            expires_in: self.jwt.expiration,
            user,
        })
    }

    /// Email y contraseña correctos o `Unauthorized`, sin revelar cuál falló
    pub async fn check_credentials<S>(&self, store: &mut S, email: &str, password: &str) -> AppResult<User>
    where
        S: UserStore + ?Sized,
    {
        let user = store
            .find_user_by_email(email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !user_service::verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "🔒 Contraseña incorrecta");
            return Err(invalid_credentials());
        }
        Ok(user)
    }

    /// Crea un USER, emite USER_REGISTERED y prepara el enrolamiento TOTP
    pub async fn signup<S>(&self, store: &mut S, request: SignUpRequest) -> AppResult<SignUpResponse>
    where
        S: UserStore + NotificationStore + ?Sized,
    {
        let user = user_service::register(
            store,
            &request.email,
            &request.password,
            Role::User,
            request.first_name,
            request.last_name,
        )
        .await?;

        notify(
            store,
            user.id,
            NotificationType::UserRegistered,
            "Welcome!",
            format!("Your account {} has been created", user.email),
            Some((user.id, "USER")),
        )
        .await?;

        let totp = self.totp.setup(store, &user).await?;
        let user = user_service::find_user(store, user.id).await?;

        Ok(SignUpResponse { user, totp })
    }

    pub async fn signin<S>(&self, store: &mut S, email: &str, password: &str) -> AppResult<SignInOutcome>
    where
        S: UserStore + ?Sized,
    {
        let user = self.check_credentials(store, email, password).await?;

        if user.totp_enabled {
            tracing::debug!(user_id = %user.id, "Se requiere segundo factor");
            return Ok(SignInOutcome::TotpRequired(TotpChallenge {
                requires_totp: true,
                email: user.email.clone(),
                totp_setup_required: !user.totp_verified,
            }));
        }

        tracing::info!(user_id = %user.id, "🔑 Login correcto");
        Ok(SignInOutcome::Authenticated(self.issue_token(user)?))
    }

    pub async fn signin_with_totp<S>(
        &self,
        store: &mut S,
        email: &str,
        password: &str,
        code: &str,
    ) -> AppResult<TokenResponse>
    where
        S: UserStore + ?Sized,
    {
        let mut user = self.check_credentials(store, email, password).await?;
        if !user.totp_enabled {
            return Err(AppError::BadRequest(
                "TOTP is not enabled for this account".to_string(),
            ));
        }
        self.totp.check_user_code(&user, code)?;

        // El primer código válido completa el enrolamiento
        if !user.totp_verified {
            self.totp.verify_enrollment(store, &user, code).await?;
            user.totp_verified = true;
        }

        tracing::info!(user_id = %user.id, "🔑 Login con TOTP correcto");
        self.issue_token(user)
    }

    /// Setup público: exige la contraseña para no permitir resetear secretos ajenos
    pub async fn public_totp_setup<S>(
        &self,
        store: &mut S,
        email: &str,
        password: &str,
    ) -> AppResult<TotpSetupResponse>
    where
        S: UserStore + ?Sized,
    {
        let user = self.check_credentials(store, email, password).await?;
        // Un secreto ya verificado solo se cambia con sesión o tras desactivarlo con código
        if user.totp_verified {
            tracing::warn!(user_id = %user.id, "Setup público rechazado: TOTP ya verificado");
            return Err(AppError::InvalidState(
                "TOTP is already verified for this account".to_string(),
            ));
        }
        self.totp.setup(store, &user).await
    }

    pub async fn public_totp_verify<S>(&self, store: &mut S, email: &str, code: &str) -> AppResult<()>
    where
        S: UserStore + ?Sized,
    {
        let user = store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid TOTP code".to_string()))?;
        self.totp.verify_enrollment(store, &user, code).await
    }

    /// Siempre responde bien, exista o no el email
    pub async fn forgot_password<S>(&self, store: &mut S, email: &str, now: DateTime<Utc>) -> AppResult<()>
    where
        S: UserStore + ?Sized,
    {
        let Some(user) = store.find_user_by_email(email).await? else {
            tracing::debug!("Recuperación solicitada para un email desconocido");
            return Ok(());
        };

        let token = generate_reset_token();
        let expires_at = now + Duration::hours(RESET_TOKEN_TTL_HOURS);
        store.set_reset_token(user.id, &token, expires_at).await?;

        let link = format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        );
        if let Err(e) = self.mailer.send_password_reset(&user.email, &link, expires_at).await {
            // No se revela el fallo al cliente
            tracing::error!(user_id = %user.id, error = %e, "No se pudo enviar el email de recuperación");
        }
        Ok(())
    }

    pub async fn reset_password<S>(
        &self,
        store: &mut S,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()>
    where
        S: UserStore + ?Sized,
    {
        let user = store
            .find_user_by_reset_token(token)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

        match user.reset_password_expiry {
            Some(expiry) if expiry > now => {}
            _ => {
                return Err(AppError::BadRequest(
                    "Invalid or expired reset token".to_string(),
                ))
            }
        }

        let password_hash = user_service::hash_password(new_password)?;
        store.update_password(user.id, &password_hash).await?;
        tracing::info!(user_id = %user.id, "🔑 Contraseña restablecida");
        Ok(())
    }
}
