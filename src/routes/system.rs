use crate::app::AppContext;
use crate::health::HealthReport;
use crate::http::{Envelope, RouteModule};
use axum::{Router, extract::State, http::StatusCode, routing::get};

/// `GET /` and `GET /api/health`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRoutes;

impl RouteModule for SystemRoutes {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(root))
            .route("/api/health", get(health))
    }
}

async fn root() -> Envelope {
    Envelope::message(StatusCode::OK, "Service is operational")
}

async fn health(State(ctx): State<AppContext>) -> HealthReport {
    ctx.health_checker().check_health().await
}
