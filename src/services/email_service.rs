//! Envío de emails transaccionales
//!
//! Con SMTP configurado se envía con `lettre`; sin él, el enlace se escribe
//! en el log (útil en desarrollo).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::environment::{EnvironmentConfig, SmtpConfig};
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(
        &self,
        to: &str,
        reset_link: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;
}

/// Mailer adecuado a la configuración
pub fn mailer_from_config(config: &EnvironmentConfig) -> Arc<dyn Mailer> {
    match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "📧 SMTP configurado");
            Arc::new(SmtpMailer::new(smtp.clone()))
        }
        None => {
            tracing::warn!("📧 SMTP no configurado, los emails se escribirán en el log");
            Arc::new(LogMailer)
        }
    }
}

pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_transport(&self) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|e| AppError::ExternalApi(format!("SMTP relay error: {}", e)))?
            .port(self.config.port);

        if let (Some(user), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }
        Ok(builder.build())
    }
}

fn password_reset_body(reset_link: &str, expires_at: DateTime<Utc>) -> String {
    let minutes = (expires_at - Utc::now()).num_minutes().max(0);
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
    <h2>Reset your password</h2>
    <p>We received a request to reset your password. This link expires in {minutes} minutes.</p>
    <p><a href="{reset_link}">Reset password</a></p>
    <p style="color: #666; font-size: 13px;">If you didn't request this, you can ignore this email.</p>
</body>
</html>"#
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(
        &self,
        to: &str,
        reset_link: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let email = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {}", e)))?)
            .subject("Reset your password")
            .header(ContentType::TEXT_HTML)
            .body(password_reset_body(reset_link, expires_at))
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let transport = self.build_transport()?;

        transport
            .send(email)
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to send email: {}", e)))?;

        tracing::info!(to, "📧 Email de recuperación enviado");
        Ok(())
    }
}

/// Sin SMTP: deja el enlace en el log
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(
        &self,
        to: &str,
        reset_link: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        tracing::info!(to, %expires_at, "📧 [sin SMTP] Enlace de recuperación: {}", reset_link);
        Ok(())
    }
}
