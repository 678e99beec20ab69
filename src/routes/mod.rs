//! Built-in route modules mounted by [`App::with_default_routes`](crate::App::with_default_routes).

mod system;
mod v1;

pub use system::SystemRoutes;
pub use v1::{LoginRequest, V1Routes};
