use super::claims::Claims;
use crate::error::WharfError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Claims placed in extensions by [`require_auth`](super::require_auth)
///
/// ```rust,ignore
/// async fn me(AuthClaims(claims): AuthClaims) -> Envelope<Claims> {
///     Envelope::ok(claims)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = WharfError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| {
                WharfError::internal("AuthClaims used on a route without require_auth")
            })
    }
}
