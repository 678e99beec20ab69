//! Component health checks behind `GET /api/health`.

use crate::http::Envelope;
use crate::websocket::Registry;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Per-check deadline
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Result of a single component check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<serde_json::Value>,
}

impl ComponentHealth {
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
            message: None,
            stats: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error,
            message: Some(message.into()),
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: impl Serialize) -> Self {
        self.stats = serde_json::to_value(stats).ok();
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// A named dependency probe
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self) -> Pin<Box<dyn Future<Output = ComponentHealth> + Send + '_>>;
}

/// Reports registry counters. Never fails.
pub struct RegistryHealthCheck {
    registry: Arc<Registry>,
}

impl RegistryHealthCheck {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

impl HealthCheck for RegistryHealthCheck {
    fn name(&self) -> &str {
        "websocket"
    }

    fn check(&self) -> Pin<Box<dyn Future<Output = ComponentHealth> + Send + '_>> {
        Box::pin(async move {
            ComponentHealth::ok().with_stats(self.registry.metrics().await)
        })
    }
}

/// Outcome of running every registered check
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.components.values().all(ComponentHealth::is_ok)
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for HealthReport {
    fn into_response(self) -> Response {
        let status = self.status_code();
        Envelope::with_status(status, self.components)
            .with_message("Health check completed")
            .into_response()
    }
}

/// Runs registered checks concurrently, each bounded by a deadline
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            timeout: HEALTH_CHECK_TIMEOUT,
        }
    }

    pub fn with_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn check_health(&self) -> HealthReport {
        let timeout = self.timeout;
        let results = futures::future::join_all(self.checks.iter().map(|check| async move {
            let health = match tokio::time::timeout(timeout, check.check()).await {
                Ok(health) => health,
                Err(_) => ComponentHealth::error(format!(
                    "health check timed out after {}s",
                    timeout.as_secs_f64()
                )),
            };
            if !health.is_ok() {
                tracing::warn!(
                    component = check.name(),
                    message = health.message.as_deref().unwrap_or_default(),
                    "health check failed"
                );
            }
            (check.name().to_string(), health)
        }))
        .await;

        HealthReport {
            components: results.into_iter().collect(),
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, ComponentHealth);

    impl HealthCheck for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn check(&self) -> Pin<Box<dyn Future<Output = ComponentHealth> + Send + '_>> {
            Box::pin(async move { self.1.clone() })
        }
    }

    struct Hangs;

    impl HealthCheck for Hangs {
        fn name(&self) -> &str {
            "slow"
        }

        fn check(&self) -> Pin<Box<dyn Future<Output = ComponentHealth> + Send + '_>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                ComponentHealth::ok()
            })
        }
    }

    async fn body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn all_ok_is_200() {
        let registry = Arc::new(Registry::new());
        let report = HealthChecker::new()
            .with_check(Arc::new(RegistryHealthCheck::new(registry)))
            .check_health()
            .await;
        assert!(report.is_healthy());

        let response = report.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body(response).await;
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["message"], "Health check completed");
        assert_eq!(json["data"]["websocket"]["status"], "ok");
        assert_eq!(json["data"]["websocket"]["stats"]["active"], 0);
    }

    #[tokio::test]
    async fn any_error_is_503() {
        let report = HealthChecker::new()
            .with_check(Arc::new(Fixed("redis", ComponentHealth::ok())))
            .with_check(Arc::new(Fixed(
                "postgres",
                ComponentHealth::error("connection refused"),
            )))
            .check_health()
            .await;

        let response = report.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = body(response).await;
        assert_eq!(json["status_code"], 503);
        assert_eq!(json["data"]["redis"]["status"], "ok");
        assert_eq!(json["data"]["postgres"]["status"], "error");
        assert_eq!(json["data"]["postgres"]["message"], "connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_check_times_out_as_error() {
        let report = HealthChecker::new()
            .with_check(Arc::new(Hangs))
            .check_health()
            .await;

        let slow = &report.components["slow"];
        assert_eq!(slow.status, HealthStatus::Error);
        assert!(slow.message.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn no_checks_is_healthy() {
        let report = HealthChecker::new().check_health().await;
        assert!(report.components.is_empty());
        assert_eq!(report.status_code(), StatusCode::OK);
    }
}
