use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::User;

// Alta de cuenta
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

// Email + contraseña (signin y setup TOTP público)
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginWithTotpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(alias = "totpCode")]
    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TotpVerifyByEmailRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TotpCodeRequest {
    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Token emitido tras un login completo
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: User,
}

/// Respuesta de signin cuando falta el segundo factor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpChallenge {
    pub requires_totp: bool,
    pub email: String,
    pub totp_setup_required: bool,
}

/// Secreto y QR para enrolar una app de autenticación
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpSetupResponse {
    pub secret: String,
    pub qr_code: String,
    pub otpauth_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpStatusResponse {
    pub enabled: bool,
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: User,
    pub totp: TotpSetupResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_requires_long_password_and_valid_email() {
        let weak = SignUpRequest {
            email: "ana@example.com".to_string(),
            password: "short".to_string(),
            first_name: None,
            last_name: None,
        };
        assert!(weak.validate().is_err());

        let bad_email = SignUpRequest {
            email: "not-an-email".to_string(),
            password: "long-enough".to_string(),
            first_name: None,
            last_name: None,
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_totp_code_must_have_six_digits() {
        assert!(TotpCodeRequest { code: "12345".into() }.validate().is_err());
        assert!(TotpCodeRequest { code: "123456".into() }.validate().is_ok());
    }
}
