//! Small request/response middleware shared by the app stack.

use crate::error::ErrorCode;
use crate::http::error_response;
use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use std::any::Any;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Assigns a v4 UUID `x-request-id` to requests that lack one
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// Development only: forbid caching of every response
pub async fn no_store(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// `CatchPanicLayer` handler: log the panic and answer with an
/// `internal_error` envelope
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = detail, "handler panicked");
    error_response(ErrorCode::InternalError, "Internal server error")
}
