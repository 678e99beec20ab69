//! Entity identifiers are random (v4) UUIDs.

use uuid::Uuid;

pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Parse a textual id. Only v4 UUIDs are accepted.
pub fn parse_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value)
        .ok()
        .filter(|id| id.get_version_num() == 4)
}

pub fn is_valid_id(value: &str) -> bool {
    parse_id(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_valid_and_distinct() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(is_valid_id(&a.to_string()));
    }

    #[test]
    fn rejects_garbage_and_other_versions() {
        assert!(!is_valid_id("not-a-uuid"));
        assert!(!is_valid_id(""));
        // nil uuid has version 0
        assert!(!is_valid_id("00000000-0000-0000-0000-000000000000"));
    }
}
