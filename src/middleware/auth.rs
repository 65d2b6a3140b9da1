// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Claims,
};

// O usuário autenticado (claims do token), guardado nas extensions da requisição
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.0.sub
    }
}

/// Valida o JWT emitido pelo login externo (Google) e devolve as claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|token_data| token_data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejeitado: {}", e);
        AppError::InvalidToken
    })
}

// Middleware: exige "Authorization: Bearer <token>" válido
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Result<TypedHeader<Authorization<Bearer>>, axum_extra::typed_header::TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .map_err(|_| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let claims = validate_token(bearer.token(), &app_state.jwt_secret)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken.into_api_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "segredo-de-teste";

    fn token_for(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn claims(exp: usize) -> Claims {
        Claims {
            sub: "uid-123".into(),
            email: Some("dueno@example.com".into()),
            role: Role::Owner,
            exp,
        }
    }

    #[test]
    fn accepts_a_valid_token() {
        let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
        let decoded = validate_token(&token_for(&claims(exp), SECRET), SECRET).unwrap();
        assert_eq!(decoded.sub, "uid-123");
        assert_eq!(decoded.role, Role::Owner);
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
        assert!(matches!(
            validate_token(&token_for(&claims(exp), "outro"), SECRET),
            Err(AppError::InvalidToken)
        ));

        let expired = (chrono::Utc::now().timestamp() - 3600) as usize;
        assert!(matches!(
            validate_token(&token_for(&claims(expired), SECRET), SECRET),
            Err(AppError::InvalidToken)
        ));
    }
}
