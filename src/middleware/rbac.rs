// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    middleware::auth::AuthenticatedUser,
    models::auth::Role,
};

/// 1. O Trait que define o papel exigido pela rota
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai Usuário (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.into_api_error())?;

        // B. O papel vem nas claims do token, não precisa ir ao banco
        let required = T::role();
        if user.0.role != required {
            return Err(AppError::Forbidden(format!(
                "É necessário o papel '{}' para realizar esta ação.",
                required.as_str()
            ))
            .into_api_error());
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct Owner;
impl RoleDef for Owner {
    fn role() -> Role { Role::Owner }
}
