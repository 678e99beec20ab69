use super::{jwt::JwtVerifier, token::TokenExtractor};
use crate::error::{ErrorCode, Result};
use crate::http::error_response;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Route middleware requiring a valid bearer JWT
///
/// On success the verified [`Claims`](super::Claims) are stored in request
/// extensions for [`AuthClaims`](super::AuthClaims).
///
/// ```rust,ignore
/// Router::new()
///     .route("/me", get(me))
///     .route_layer(axum::middleware::from_fn_with_state(verifier, require_auth));
/// ```
pub async fn require_auth(
    State(verifier): State<Arc<JwtVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = TokenExtractor::from_header(request.headers())?;

    if !verifier.is_configured() {
        tracing::error!("JWT secret is empty; rejecting authenticated request");
        return Ok(error_response(
            ErrorCode::InternalError,
            "Server configuration error",
        ));
    }

    let claims = verifier.verify(token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
