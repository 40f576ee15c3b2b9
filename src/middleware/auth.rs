//! Middleware de autenticación JWT
//!
//! Verifica el token Bearer sin consultar la base de datos e inyecta el
//! `AuthenticatedUser` en las extensions de la request. Los servicios lo
//! reciben explícitamente a través de `Extension<AuthenticatedUser>`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    models::auth::AuthenticatedUser,
    state::AppState,
    utils::errors::AppError,
    utils::jwt::{extract_token_from_header, verify_token},
};

/// Middleware de autenticación obligatoria
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(header_value)?;
    let claims = verify_token(token, &state.jwt)?;
    let user = AuthenticatedUser::try_from(claims)?;

    tracing::debug!(user_id = %user.user_id, role = user.role.as_str(), "Usuario autenticado");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
