//! Bearer JWT authentication.
//!
//! [`require_auth`] guards routes; [`AuthClaims`] reads the verified claims
//! inside handlers.

pub mod claims;
pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod token;

pub use claims::Claims;
pub use extractors::AuthClaims;
pub use jwt::JwtVerifier;
pub use middleware::require_auth;
pub use token::TokenExtractor;
