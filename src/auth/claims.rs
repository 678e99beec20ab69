use crate::error::{Result, WharfError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Verified JWT payload as an open JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Non-empty string claim
    pub fn str(&self, key: &str) -> Result<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s),
            Some(other) => Err(WharfError::unauthorized(format!(
                "claim '{key}' is not a non-empty string, got {other}"
            ))),
            None => Err(WharfError::unauthorized(format!("claim '{key}' is missing"))),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_accepts_only_non_empty_strings() {
        let claims = Claims::new()
            .with("sub", "user-1")
            .with("empty", "")
            .with("n", 42);

        assert_eq!(claims.str("sub").unwrap(), "user-1");
        assert!(claims.str("empty").is_err());
        assert!(claims.str("n").is_err());
        assert!(claims.str("missing").is_err());
    }

    #[test]
    fn serializes_as_plain_object() {
        let claims = Claims::new().with("role", "admin");
        assert_eq!(
            serde_json::to_value(&claims).unwrap(),
            serde_json::json!({"role": "admin"})
        );
    }
}
