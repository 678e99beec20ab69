//! HTTP response envelope and route composition.

pub mod response;
pub mod routes;

pub use response::{Envelope, ErrorBody, error_response};
pub use routes::RouteModule;
