//! Segundo factor TOTP (RFC 6238: HMAC-SHA1, 6 dígitos, pasos de 30s)
//!
//! La generación de secretos, el QR y la verificación los hace `totp-rs`.
//! Aquí solo vive la máquina de enrolamiento:
//! `enabled=false, verified=false` → setup → `enabled=true, verified=false`
//! → verify → `verified=true`. Desactivar exige un código válido y borra el
//! secreto.

use chrono::Utc;
use totp_rs::{Algorithm, Secret, TOTP};

use crate::dto::auth_dto::{TotpSetupResponse, TotpStatusResponse};
use crate::models::user::User;
use crate::repositories::UserStore;
use crate::utils::errors::{AppError, AppResult};

const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP: u64 = 30;

#[derive(Debug, Clone)]
pub struct TotpService {
    issuer: String,
}

impl TotpService {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    /// Secreto base32 nuevo (160 bits)
    pub fn generate_secret(&self) -> AppResult<String> {
        match Secret::generate_secret().to_encoded() {
            Secret::Encoded(secret) => Ok(secret),
            Secret::Raw(_) => Err(AppError::Internal(
                "TOTP secret could not be encoded".to_string(),
            )),
        }
    }

    fn totp(&self, secret: &str, account: &str) -> AppResult<TOTP> {
        let bytes = Secret::Encoded(secret.to_string())
            .to_bytes()
            .map_err(|e| AppError::Internal(format!("Invalid TOTP secret: {:?}", e)))?;

        TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            SKEW,
            STEP,
            bytes,
            Some(self.issuer.clone()),
            account.to_string(),
        )
        .map_err(|e| AppError::Internal(format!("Invalid TOTP parameters: {}", e)))
    }

    /// URL otpauth y QR (PNG en base64) para la app de autenticación
    pub fn setup_material(&self, secret: &str, account: &str) -> AppResult<TotpSetupResponse> {
        let totp = self.totp(secret, account)?;
        let qr = totp
            .get_qr_base64()
            .map_err(|e| AppError::Internal(format!("QR generation failed: {}", e)))?;

        Ok(TotpSetupResponse {
            secret: secret.to_string(),
            qr_code: format!("data:image/png;base64,{}", qr),
            otpauth_url: totp.get_url(),
        })
    }

    /// Verifica un código en un instante dado (se acepta ±1 paso)
    pub fn verify_at(&self, secret: &str, account: &str, code: &str, unix_time: u64) -> AppResult<bool> {
        let code = code.trim();
        if code.len() != DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
            return Ok(false);
        }
        Ok(self.totp(secret, account)?.check(code, unix_time))
    }

    pub fn verify(&self, secret: &str, account: &str, code: &str) -> AppResult<bool> {
        self.verify_at(secret, account, code, Utc::now().timestamp().max(0) as u64)
    }

    /// Código vigente en un instante dado
    pub fn code_at(&self, secret: &str, account: &str, unix_time: u64) -> AppResult<String> {
        Ok(self.totp(secret, account)?.generate(unix_time))
    }

    /// Comprueba el código contra el secreto guardado del usuario
    pub fn check_user_code(&self, user: &User, code: &str) -> AppResult<()> {
        let secret = user
            .totp_secret
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("TOTP is not set up for this account".to_string()))?;

        if self.verify(secret, &user.email, code)? {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Invalid TOTP code".to_string()))
        }
    }

    /// Genera un secreto nuevo y deja el enrolamiento pendiente de verificar
    pub async fn setup<S>(&self, store: &mut S, user: &User) -> AppResult<TotpSetupResponse>
    where
        S: UserStore + ?Sized,
    {
        let secret = self.generate_secret()?;
        let material = self.setup_material(&secret, &user.email)?;
        store.set_totp_state(user.id, Some(&secret), true, false).await?;

        tracing::info!(user_id = %user.id, "🔐 TOTP configurado, pendiente de verificación");
        Ok(material)
    }

    pub async fn verify_enrollment<S>(&self, store: &mut S, user: &User, code: &str) -> AppResult<()>
    where
        S: UserStore + ?Sized,
    {
        self.check_user_code(user, code)?;
        store
            .set_totp_state(user.id, user.totp_secret.as_deref(), true, true)
            .await?;

        tracing::info!(user_id = %user.id, "✅ TOTP verificado");
        Ok(())
    }

    pub async fn disable<S>(&self, store: &mut S, user: &User, code: &str) -> AppResult<()>
    where
        S: UserStore + ?Sized,
    {
        self.check_user_code(user, code)?;
        store.set_totp_state(user.id, None, false, false).await?;

        tracing::info!(user_id = %user.id, "🔓 TOTP desactivado");
        Ok(())
    }

    pub fn status(&self, user: &User) -> TotpStatusResponse {
        TotpStatusResponse {
            enabled: user.totp_enabled,
            verified: user.totp_verified,
        }
    }
}
