use super::claims::Claims;
use crate::error::{Result, WharfError};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::Duration;

/// HMAC-only JWT verifier and issuer bound to one shared secret
///
/// Any of HS256, HS384 and HS512 is accepted on verification; anything else
/// (including `none` and the RSA/EC families) is rejected. Expiry is always
/// checked and tokens without `exp` are refused.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    token_ttl: Duration,
    configured: bool,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("token_ttl", &self.token_ttl)
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn from_secret(secret: &str, token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
            configured: !secret.is_empty(),
        }
    }

    /// False when built from an empty secret
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Verify signature, algorithm family and expiry
    pub fn verify(&self, token: &str) -> Result<Claims> {
        if !self.configured {
            return Err(WharfError::internal("JWT secret is not configured"));
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                WharfError::unauthorized("Invalid or expired token")
            })
    }

    /// Sign `claims` with HS256, stamping `iat` and `exp` from the configured TTL
    pub fn issue(&self, claims: Claims) -> Result<String> {
        self.issue_with_ttl(claims, self.token_ttl)
    }

    pub fn issue_with_ttl(&self, mut claims: Claims, ttl: Duration) -> Result<String> {
        if !self.configured {
            return Err(WharfError::internal("JWT secret is not configured"));
        }

        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs())
            .map_err(|_| WharfError::internal("token TTL out of range"))?;
        claims.insert("iat", now).insert("exp", now + ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| WharfError::internal(format!("failed to sign token: {e}")))
    }
}
