//! Human-readable validation messages
//!
//! One message per failing field. When a field fails several rules the
//! `required` failure wins, otherwise the first reported failure is used.

use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Custom rule: the string must not be empty (code `required`)
pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Custom rule: ASCII letters and digits only (code `alphanumeric`)
pub fn alphanumeric(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphanumeric"))
    }
}

/// Field name to its messages, ordered by field name
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let chosen = errs
                .iter()
                .find(|e| e.code == "required")
                .or_else(|| errs.first())?;
            let field = field.to_string();
            let message = message_for(&field, chosen);
            Some((field, vec![message]))
        })
        .collect()
}

/// Message for a single rule failure
pub fn message_for(field: &str, error: &ValidationError) -> String {
    match error.code.as_ref() {
        "required" => format!("{field} is required"),
        "email" => format!("{field} must be a valid email address"),
        "length" => length_message(field, error),
        "alphanumeric" => format!("{field} must contain only alphanumeric characters"),
        _ => format!("{field} is invalid"),
    }
}

fn length_message(field: &str, error: &ValidationError) -> String {
    let param = |name: &str| error.params.get(name).and_then(|v| v.as_u64());
    let actual = error
        .params
        .get("value")
        .and_then(|v| v.as_str())
        .map(|s| s.chars().count() as u64);

    match (param("min"), param("max"), actual) {
        (Some(min), _, Some(len)) if len < min => format!("{field} must be at least {min} characters"),
        (_, Some(max), Some(len)) if len > max => format!("{field} must be at most {max} characters"),
        (Some(min), None, _) => format!("{field} must be at least {min} characters"),
        (None, Some(max), _) => format!("{field} must be at most {max} characters"),
        _ => format!("{field} is invalid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Login {
        #[validate(custom(function = "required"), length(min = 3, max = 50))]
        username: String,
        #[validate(custom(function = "required"), length(min = 6))]
        password: String,
    }

    #[derive(Debug, Validate)]
    struct Profile {
        #[validate(email)]
        email: String,
        #[validate(custom(function = "alphanumeric"))]
        handle: String,
    }

    fn login(username: &str, password: &str) -> Login {
        Login {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn empty_fields_report_required_only() {
        let errors = login("", "").validate().unwrap_err();
        let messages = field_messages(&errors);

        assert_eq!(messages["password"], vec!["password is required"]);
        assert_eq!(messages["username"], vec!["username is required"]);
    }

    #[test]
    fn length_bounds_are_named() {
        let errors = login("ab", "12345").validate().unwrap_err();
        let messages = field_messages(&errors);
        assert_eq!(messages["username"], vec!["username must be at least 3 characters"]);
        assert_eq!(messages["password"], vec!["password must be at least 6 characters"]);

        let long = "x".repeat(51);
        let errors = login(&long, "secret1").validate().unwrap_err();
        assert_eq!(
            field_messages(&errors)["username"],
            vec!["username must be at most 50 characters"]
        );
    }

    #[test]
    fn fields_are_ordered_by_name() {
        let errors = login("", "").validate().unwrap_err();
        let fields: Vec<_> = field_messages(&errors).into_keys().collect();
        assert_eq!(fields, vec!["password", "username"]);
    }

    #[test]
    fn email_and_alphanumeric_messages() {
        let profile = Profile {
            email: "not-an-email".into(),
            handle: "has space".into(),
        };
        let messages = field_messages(&profile.validate().unwrap_err());
        assert_eq!(messages["email"], vec!["email must be a valid email address"]);
        assert_eq!(
            messages["handle"],
            vec!["handle must contain only alphanumeric characters"]
        );
    }

    #[test]
    fn unknown_code_is_invalid() {
        let error = ValidationError::new("range");
        assert_eq!(message_for("age", &error), "age is invalid");
    }
}
