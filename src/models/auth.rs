use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

/// Roles del sistema - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Permisos concedidos al rol
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => Permission::ALL,
            Role::User => &[],
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Permisos explícitos. La propiedad de un recurso se comprueba aparte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Permission {
    ManageCars,
    ManageUsers,
    ViewAllReservations,
    ManageReservations,
    CancelAnyReservation,
    ManagePayments,
    ViewAllNotifications,
    ClearNotifications,
    ManageImages,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::ManageCars,
        Permission::ManageUsers,
        Permission::ViewAllReservations,
        Permission::ManageReservations,
        Permission::CancelAnyReservation,
        Permission::ManagePayments,
        Permission::ViewAllNotifications,
        Permission::ClearNotifications,
        Permission::ManageImages,
    ];
}

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Usuario autenticado que el middleware inyecta en cada request.
///
/// Es el contexto explícito que reciben los servicios; no existe ningún
/// contexto de seguridad global.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.role.has(permission)
    }

    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Missing permission {:?}",
                permission
            )))
        }
    }

    /// Dueño del recurso o poseedor del permiso
    pub fn require_owner_or(&self, owner_id: Uuid, permission: Permission) -> AppResult<()> {
        if self.user_id == owner_id || self.can(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You are not allowed to access this resource".to_string(),
            ))
        }
    }
}

impl TryFrom<JwtClaims> for AuthenticatedUser {
    type Error = AppError;

    fn try_from(claims: JwtClaims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))?;
        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_holds_every_permission() {
        for p in Permission::ALL {
            assert!(Role::Admin.has(*p));
            assert!(!Role::User.has(*p));
        }
    }

    #[test]
    fn test_owner_or_permission() {
        let owner = Uuid::new_v4();
        let user = AuthenticatedUser::new(owner, "a@example.com", Role::User);
        assert!(user
            .require_owner_or(owner, Permission::ViewAllReservations)
            .is_ok());

        let stranger = AuthenticatedUser::new(Uuid::new_v4(), "b@example.com", Role::User);
        assert!(matches!(
            stranger.require_owner_or(owner, Permission::ViewAllReservations),
            Err(AppError::Forbidden(_))
        ));

        let admin = AuthenticatedUser::new(Uuid::new_v4(), "c@example.com", Role::Admin);
        assert!(admin
            .require_owner_or(owner, Permission::ViewAllReservations)
            .is_ok());
    }

    #[test]
    fn test_role_from_str_is_case_insensitive() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("USER"), Some(Role::User));
        assert_eq!(Role::from_str("root"), None);
    }
}
