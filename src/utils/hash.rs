use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `text`.
///
/// Suitable for cache keys and fingerprints, not for passwords.
pub fn hash_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
