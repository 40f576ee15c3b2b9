//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Solo `DATABASE_URL` y
//! `JWT_SECRET` son obligatorias; el resto tiene valores por defecto o es
//! opcional (SMTP, Cloudinary).

use anyhow::{anyhow, Context, Result};
use std::{env, str::FromStr};

/// Configuración SMTP para el envío de emails
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Credenciales de Cloudinary
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    /// Solo detrás de un proxy propio: el limitador usa `x-forwarded-for`
    pub trust_proxy_headers: bool,
    pub upload_dir: String,
    pub totp_issuer: String,
    pub frontend_url: String,
    pub smtp: Option<SmtpConfig>,
    pub cloudinary: Option<CloudinaryConfig>,
}

impl EnvironmentConfig {
    /// Cargar la configuración desde las variables de entorno del proceso
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Cargar la configuración desde una fuente arbitraria de variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{} must be set", key));

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_or(get("SMTP_PORT"), "SMTP_PORT", 587)?,
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
                from: get("MAIL_FROM").unwrap_or_else(|| "no-reply@cars.local".to_string()),
            }),
            None => None,
        };

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_or(get("PORT"), "PORT", 8080)?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration: parse_or(get("JWT_EXPIRATION"), "JWT_EXPIRATION", 86_400)?,
            cors_origins: get("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rate_limit_requests: parse_or(get("RATE_LIMIT_REQUESTS"), "RATE_LIMIT_REQUESTS", 20)?,
            rate_limit_window: parse_or(get("RATE_LIMIT_WINDOW"), "RATE_LIMIT_WINDOW", 60)?,
            trust_proxy_headers: parse_or(get("TRUST_PROXY_HEADERS"), "TRUST_PROXY_HEADERS", false)?,
            upload_dir: get("UPLOAD_DIR").unwrap_or_else(|| "./uploads/cars".to_string()),
            totp_issuer: get("TOTP_ISSUER").unwrap_or_else(|| "Cars App".to_string()),
            frontend_url: get("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            smtp,
            cloudinary,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_required_vars_are_set() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/cars"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.jwt_expiration, 86_400);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.totp_issuer, "Cars App");
        assert!(!config.trust_proxy_headers);
        assert!(config.is_development());
        assert!(config.smtp.is_none());
        assert!(config.cloudinary.is_none());
    }

    #[test]
    fn test_missing_required_var_is_an_error() {
        let err = EnvironmentConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let result = EnvironmentConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_integrations() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("SMTP_HOST", "smtp.example.com"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CORS_ORIGINS", "http://a.com, http://b.com"),
        ]))
        .unwrap();

        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        // Cloudinary sin secreto queda desactivado
        assert!(config.cloudinary.is_none());
        assert_eq!(config.cors_origins.len(), 2);
    }
}
