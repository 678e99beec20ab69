use crate::error::WharfError;
use axum::http::{HeaderMap, header::AUTHORIZATION};

pub const MISSING_HEADER: &str = "Authorization header is required";
pub const MALFORMED_HEADER: &str = "Invalid authorization header format. Expected: Bearer <token>";

/// Extracts bearer tokens from request headers
pub struct TokenExtractor;

impl TokenExtractor {
    /// Token from `Authorization: Bearer <token>`; the scheme is matched
    /// case-insensitively. An empty token is returned as-is and fails
    /// verification later.
    pub fn from_header(headers: &HeaderMap) -> Result<&str, WharfError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or_else(|| WharfError::unauthorized(MISSING_HEADER))?
            .to_str()
            .map_err(|_| WharfError::unauthorized(MALFORMED_HEADER))?;

        if value.is_empty() {
            return Err(WharfError::unauthorized(MISSING_HEADER));
        }

        match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
            _ => Err(WharfError::unauthorized(MALFORMED_HEADER)),
        }
    }
}
