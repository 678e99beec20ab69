//! Request validation on top of the `validator` crate.
//!
//! [`ValidatedJson`] rejects malformed bodies with 400 and failed rules with
//! 422, listing one human-readable message per field.
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use validator::Validate;
//! use wharf::validation::ValidatedJson;
//!
//! #[derive(Deserialize, Validate)]
//! struct Signup {
//!     #[validate(email)]
//!     email: String,
//!     #[validate(length(min = 8))]
//!     password: String,
//! }
//!
//! async fn signup(ValidatedJson(body): ValidatedJson<Signup>) -> wharf::Result<()> {
//!     let _ = body;
//!     Ok(())
//! }
//! ```

#[cfg(feature = "validation")]
mod extractor;
#[cfg(feature = "validation")]
mod messages;

#[cfg(feature = "validation")]
pub use extractor::ValidatedJson;
#[cfg(feature = "validation")]
pub use messages::{alphanumeric, field_messages, message_for, required};
#[cfg(feature = "validation")]
pub use validator;
