//! Small helpers shared across the crate.

pub mod env;
pub mod hash;
pub mod ids;
pub mod time;

pub use env::{get_env_with_prefix, parse_duration};
pub use hash::hash_text;
pub use ids::{is_valid_id, new_id, parse_id};
pub use time::{is_today, today_in};
