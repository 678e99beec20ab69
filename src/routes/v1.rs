use crate::app::AppContext;
use crate::auth::{AuthClaims, Claims, JwtVerifier, require_auth};
use crate::error::{Result, WharfError};
use crate::http::{Envelope, RouteModule};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

#[cfg(feature = "validation")]
use crate::validation::{ValidatedJson, required};
#[cfg(feature = "validation")]
use validator::Validate;

/// Versioned API under `/api/v1`
pub struct V1Routes {
    jwt: Arc<JwtVerifier>,
}

impl V1Routes {
    pub fn new(jwt: Arc<JwtVerifier>) -> Self {
        Self { jwt }
    }
}

impl RouteModule for V1Routes {
    fn routes(&self) -> Router<AppContext> {
        let protected = Router::new()
            .route("/me", get(me))
            .route_layer(from_fn_with_state(self.jwt.clone(), require_auth));

        Router::new().route("/login", post(login)).merge(protected)
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/v1")
    }
}

/// Body of `POST /api/v1/login`. Missing fields deserialize as empty and
/// are then reported as required.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct LoginRequest {
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(custom(function = "required"), length(min = 3, max = 50))
    )]
    pub username: String,

    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(custom(function = "required"), length(min = 6))
    )]
    pub password: String,
}

#[cfg(feature = "validation")]
async fn login(ValidatedJson(_body): ValidatedJson<LoginRequest>) -> Result<Envelope> {
    Err(WharfError::not_implemented(
        "Login functionality not yet implemented",
    ))
}

#[cfg(not(feature = "validation"))]
async fn login(axum::Json(_body): axum::Json<LoginRequest>) -> Result<Envelope> {
    Err(WharfError::not_implemented(
        "Login functionality not yet implemented",
    ))
}

async fn me(AuthClaims(claims): AuthClaims) -> Envelope<Claims> {
    Envelope::ok(claims)
}
