use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{error::AuthError, jwt::TokenKeys};

/// Extracts and validates the bearer access token, yielding the user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);

        // 'Bearer <access token>'
        let authorization = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;

        let token = authorization
            .strip_prefix("Bearer ")
            .ok_or(AuthError::TokenRejected)?;

        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "access token rejected");
            AuthError::TokenRejected
        })?;

        Ok(AuthUser(claims.sub))
    }
}
