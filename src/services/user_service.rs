//! Gestión de usuarios y contraseñas

use bcrypt::{hash, verify, DEFAULT_COST};
use uuid::Uuid;

use crate::dto::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::models::{
    auth::{AuthenticatedUser, Permission, Role},
    user::User,
};
use crate::repositories::UserStore;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::{normalize_email, MIN_PASSWORD_LENGTH};

// Coste mínimo en tests para no ralentizarlos
const BCRYPT_COST: u32 = if cfg!(test) { 4 } else { DEFAULT_COST };

pub fn hash_password(password: &str) -> AppResult<String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    hash(password, BCRYPT_COST).map_err(|e| AppError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    verify(password, password_hash).map_err(|e| AppError::Hash(e.to_string()))
}

/// Alta con email único (sin distinguir mayúsculas)
pub async fn register<S>(
    store: &mut S,
    email: &str,
    password: &str,
    role: Role,
    first_name: Option<String>,
    last_name: Option<String>,
) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    let email = normalize_email(email);
    if store.email_exists(&email).await? {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let user = User::new(email, hash_password(password)?, role, first_name, last_name);
    let user = store.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, role = role.as_str(), "👤 Usuario registrado");
    Ok(user)
}

pub async fn find_user<S>(store: &mut S, id: Uuid) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    store
        .find_user(id)
        .await?
        .ok_or_else(|| not_found_error("User", id))
}

pub async fn list_users<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<Vec<User>>
where
    S: UserStore + ?Sized,
{
    actor.require(Permission::ManageUsers)?;
    store.list_users().await
}

pub async fn get_user<S>(store: &mut S, actor: &AuthenticatedUser, id: Uuid) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    actor.require_owner_or(id, Permission::ManageUsers)?;
    find_user(store, id).await
}

pub async fn create_user<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    request: CreateUserRequest,
) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    actor.require(Permission::ManageUsers)?;
    register(
        store,
        &request.email,
        &request.password,
        request.role.unwrap_or(Role::User),
        request.first_name,
        request.last_name,
    )
    .await
}

/// Actualiza el perfil propio, o cualquiera con ManageUsers.
/// Cambiar el rol exige siempre ManageUsers.
pub async fn update_user<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    request: UpdateUserRequest,
) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    actor.require_owner_or(id, Permission::ManageUsers)?;
    let current = find_user(store, id).await?;
    let role_change = request.role.filter(|r| *r != current.role);
    if role_change.is_some() {
        actor.require(Permission::ManageUsers)?;
    }

    let email = match request.email.as_deref().map(normalize_email) {
        Some(email) if email != current.email.to_lowercase() => {
            if store.email_exists(&email).await? {
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
            email
        }
        _ => current.email.clone(),
    };

    let mut user = store
        .update_user_profile(
            id,
            &email,
            request.first_name.as_deref().or(current.first_name.as_deref()),
            request.last_name.as_deref().or(current.last_name.as_deref()),
            request
                .profile_image
                .as_deref()
                .or(current.profile_image.as_deref()),
        )
        .await?;

    if let Some(role) = role_change {
        user = store.update_user_role(id, role).await?;
    }

    Ok(user)
}

pub async fn update_role<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    role: Role,
) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    actor.require(Permission::ManageUsers)?;
    let user = store.update_user_role(id, role).await?;
    tracing::info!(user_id = %id, role = role.as_str(), by = %actor.email, "Rol actualizado");
    Ok(user)
}

pub async fn delete_user<S>(store: &mut S, actor: &AuthenticatedUser, id: Uuid) -> AppResult<()>
where
    S: UserStore + ?Sized,
{
    actor.require(Permission::ManageUsers)?;
    if !store.delete_user(id).await? {
        return Err(not_found_error("User", id));
    }
    tracing::info!(user_id = %id, by = %actor.email, "🗑️ Usuario eliminado");
    Ok(())
}
