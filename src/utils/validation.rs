//! Utilidades de validación
//!
//! Funciones helper para validación de datos y conversión de tipos que
//! los derives de `validator` no cubren.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Email canónico: sin espacios y en minúsculas
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Interpretar una fecha de reserva.
///
/// Acepta `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (con o sin fracción) y RFC3339;
/// solo se conserva el día.
pub fn parse_flexible_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }

    let mut error = ValidationError::new("date");
    error.add_param("value".into(), &value.to_string());
    error.add_param("format".into(), &"YYYY-MM-DD".to_string());
    Err(error)
}

/// `deserialize_with` para campos de fecha de los DTO
pub fn deserialize_flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw)
        .map_err(|_| serde::de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Validar que un importe sea estrictamente positivo
pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty"));
    }
    Ok(())
}

/// Extensión en minúsculas de un nombre de fichero, si tiene
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_flexible_date() {
        let expected = NaiveDate::from_ymd_opt(2030, 1, 15).unwrap();
        assert_eq!(parse_flexible_date("2030-01-15").unwrap(), expected);
        assert_eq!(parse_flexible_date("2030-01-15T10:30:00").unwrap(), expected);
        assert_eq!(parse_flexible_date("2030-01-15T10:30:00.123").unwrap(), expected);
        assert_eq!(parse_flexible_date("2030-01-15T10:30:00Z").unwrap(), expected);
        assert!(parse_flexible_date("15/01/2030").is_err());
    }

    #[test]
    fn test_deserialize_flexible_date() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(deserialize_with = "deserialize_flexible_date")]
            day: NaiveDate,
        }

        let payload: Payload = serde_json::from_str(r#"{"day":"2030-03-01T00:00:00"}"#).unwrap();
        assert_eq!(payload.day, NaiveDate::from_ymd_opt(2030, 3, 1).unwrap());
        assert!(serde_json::from_str::<Payload>(r#"{"day":"tomorrow"}"#).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount(&Decimal::from_str("49.99").unwrap()).is_ok());
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::from(-5)).is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension(".hidden"), None);
    }
}
