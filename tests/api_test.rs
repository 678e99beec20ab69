use axum::{Router, http::StatusCode};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use wharf::auth::{Claims, JwtVerifier};
use wharf::cors::CorsConfig;
use wharf::ratelimit::RateLimitConfig;
use wharf::{App, AppContext, Config, ConfigBuilder, testing};

const SECRET: &str = "integration-test-secret";

fn config() -> Config {
    ConfigBuilder::new()
        .with_secret_key(SECRET)
        .build()
        .unwrap()
}

fn router_with(config: Config) -> Router {
    let ctx = AppContext::from_config(config.clone());
    App::with_config(config)
        .with_context(ctx)
        .with_default_routes()
        .into_router()
        .unwrap()
}

fn router() -> Router {
    router_with(config())
}

fn token(secret: &str) -> String {
    JwtVerifier::from_secret(secret, Duration::from_secs(300))
        .issue(Claims::new().with("user_id", "u-42").with("role", "admin"))
        .unwrap()
}

#[tokio::test]
async fn root_reports_operational() {
    testing::get(router(), "/")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("status_code", json!(200))
        .await
        .assert_json_path("message", json!("Service is operational"))
        .await;
}

#[tokio::test]
async fn health_without_backends_lists_websocket_only() {
    let body: serde_json::Value = testing::get(router(), "/api/health")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(body["message"], "Health check completed");
    assert_eq!(body["data"]["websocket"]["status"], "ok");
    assert!(body["data"].get("postgres").is_none());
    assert!(body["data"].get("redis").is_none());
}

#[tokio::test]
async fn login_rejects_malformed_json() {
    testing::post(router(), "/api/v1/login")
        .raw_json("{not json")
        .execute()
        .await
        .assert_bad_request()
        .assert_error_code("bad_request")
        .await;
}

#[tokio::test]
async fn login_reports_every_invalid_field() {
    testing::post(router(), "/api/v1/login")
        .json_body(&json!({"username": "ab", "password": "12345"}))
        .execute()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_error_code("validation_error")
        .await
        .assert_json_path(
            "error.message",
            json!("password must be at least 6 characters; username must be at least 3 characters"),
        )
        .await;
}

#[tokio::test]
async fn login_missing_fields_are_required() {
    testing::post(router(), "/api/v1/login")
        .json_body(&json!({}))
        .execute()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_path(
            "error.message",
            json!("password is required; username is required"),
        )
        .await;
}

#[tokio::test]
async fn valid_login_is_not_implemented() {
    testing::post(router(), "/api/v1/login")
        .json_body(&json!({"username": "alice", "password": "hunter22"}))
        .execute()
        .await
        .assert_status(StatusCode::NOT_IMPLEMENTED)
        .assert_error_code("not_implemented")
        .await
        .assert_json_path(
            "error.message",
            json!("Login functionality not yet implemented"),
        )
        .await;
}

#[tokio::test]
async fn me_requires_authorization_header() {
    testing::get(router(), "/api/v1/me")
        .execute()
        .await
        .assert_unauthorized()
        .assert_error_code("unauthorized")
        .await
        .assert_json_path("error.message", json!("Authorization header is required"))
        .await;
}

#[tokio::test]
async fn me_rejects_non_bearer_scheme() {
    testing::get(router(), "/api/v1/me")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .execute()
        .await
        .assert_unauthorized()
        .assert_json_path(
            "error.message",
            json!("Invalid authorization header format. Expected: Bearer <token>"),
        )
        .await;
}

#[tokio::test]
async fn me_rejects_token_signed_with_other_secret() {
    testing::get(router(), "/api/v1/me")
        .bearer_token(&token("some-other-secret"))
        .execute()
        .await
        .assert_unauthorized()
        .assert_json_path("error.message", json!("Invalid or expired token"))
        .await;
}

#[tokio::test]
async fn me_echoes_claims() {
    testing::get(router(), "/api/v1/me")
        .header("authorization", &format!("bearer {}", token(SECRET)))
        .execute()
        .await
        .assert_ok()
        .assert_json_path("data.user_id", json!("u-42"))
        .await
        .assert_json_path("data.role", json!("admin"))
        .await;
}

#[tokio::test]
async fn me_with_empty_secret_is_configuration_error() {
    let config = ConfigBuilder::new().with_secret_key("").build().unwrap();

    testing::get(router_with(config), "/api/v1/me")
        .bearer_token(&token(SECRET))
        .execute()
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_code("internal_error")
        .await
        .assert_json_path("error.message", json!("Server configuration error"))
        .await;
}

#[tokio::test]
async fn responses_carry_security_headers() {
    testing::get(router(), "/")
        .execute()
        .await
        .assert_header("x-content-type-options", "nosniff")
        .assert_header("x-frame-options", "DENY")
        .assert_header("x-xss-protection", "1; mode=block")
        .assert_header("referrer-policy", "no-referrer")
        .assert_header("strict-transport-security", "max-age=31536000")
        .assert_header("cross-origin-opener-policy", "same-origin");
}

#[tokio::test]
async fn cors_allows_dev_default_origin() {
    testing::get(router(), "/")
        .origin("http://localhost:3000")
        .execute()
        .await
        .assert_header("access-control-allow-origin", "http://localhost:3000")
        .assert_header("access-control-allow-credentials", "true");
}

#[tokio::test]
async fn cors_ignores_unlisted_origin() {
    let config = ConfigBuilder::new()
        .with_cors(CorsConfig::builder().allow_origin("https://app.example.com").build())
        .build()
        .unwrap();

    testing::get(router_with(config), "/")
        .origin("https://evil.example.com")
        .execute()
        .await
        .assert_ok()
        .assert_no_header("access-control-allow-origin");
}

#[tokio::test]
async fn rate_limit_answers_429_with_retry_after() {
    let config = ConfigBuilder::new()
        .with_rate_limit(
            RateLimitConfig::builder()
                .max_requests(2)
                .window_seconds(60)
                .build(),
        )
        .build()
        .unwrap();
    let app = router_with(config);
    let peer: SocketAddr = "203.0.113.7:40000".parse().unwrap();

    for _ in 0..2 {
        testing::get(app.clone(), "/").peer(peer).execute().await.assert_ok();
    }

    let limited = testing::get(app.clone(), "/")
        .peer(peer)
        .execute()
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.header("retry-after").is_some());
    limited
        .assert_error_code("rate_limit_exceeded")
        .await
        .assert_json_path(
            "error.message",
            json!("Too many requests, please try again later"),
        )
        .await;

    // other clients and health probes are unaffected
    let other: SocketAddr = "198.51.100.1:40000".parse().unwrap();
    testing::get(app.clone(), "/").peer(other).execute().await.assert_ok();
    testing::get(app, "/api/health").peer(peer).execute().await.assert_ok();
}

#[tokio::test]
async fn websocket_route_requires_upgrade() {
    let response = testing::get(router(), "/ws").execute().await.response();
    assert!(response.status().is_client_error());
}
