use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower::ServiceExt;

/// One request against a router, built fluently
pub struct Scenario {
    app: Router,
    request: Request<Body>,
}

impl Scenario {
    pub fn new(app: Router) -> Self {
        let mut request = Request::new(Body::empty());
        *request.uri_mut() = "/".parse().unwrap();
        Self { app, request }
    }

    pub fn method(mut self, method: Method) -> Self {
        *self.request.method_mut() = method;
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        *self.request.uri_mut() = uri.parse().unwrap();
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request.headers_mut().insert(
            HeaderName::from_bytes(key.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        self
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer_token(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {token}"))
    }

    pub fn origin(self, origin: &str) -> Self {
        self.header("origin", origin)
    }

    /// Pretend the request arrived from `addr`, as `ConnectInfo` would
    pub fn peer(mut self, addr: SocketAddr) -> Self {
        self.request.extensions_mut().insert(ConnectInfo(addr));
        self
    }

    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        let json = serde_json::to_vec(body).unwrap();
        *self.request.body_mut() = Body::from(json);
        self.request
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Raw body sent as `application/json`, for malformed-input cases
    pub fn raw_json(mut self, body: impl Into<String>) -> Self {
        *self.request.body_mut() = Body::from(body.into());
        self.request
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    pub async fn execute(self) -> ScenarioAssert {
        let response = self.app.oneshot(self.request).await.unwrap();
        ScenarioAssert { response }
    }
}

/// Assertions over a scenario's response
pub struct ScenarioAssert {
    response: Response,
}

impl ScenarioAssert {
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_unauthorized(self) -> Self {
        self.assert_status(StatusCode::UNAUTHORIZED)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_header(self, key: &str, expected: &str) -> Self {
        let value = self
            .response
            .headers()
            .get(key)
            .unwrap_or_else(|| panic!("header '{key}' not found"))
            .to_str()
            .unwrap();
        assert_eq!(value, expected, "header '{key}' value mismatch");
        self
    }

    pub fn assert_no_header(self, key: &str) -> Self {
        assert!(
            !self.response.headers().contains_key(key),
            "unexpected header '{key}'"
        );
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.response.headers().get(key)?.to_str().ok()
    }

    pub async fn body_bytes(self) -> Vec<u8> {
        axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn body_string(self) -> String {
        String::from_utf8(self.body_bytes().await).unwrap()
    }

    pub async fn json<T: for<'de> Deserialize<'de>>(self) -> T {
        let bytes = self.body_bytes().await;
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Dot path into the JSON body, e.g. `error.code` or `data.items.0`
    pub async fn assert_json_path(self, path: &str, expected: serde_json::Value) -> Self {
        let (parts, bytes) = self.into_parts().await;
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let actual = json_path_get(&json, path)
            .unwrap_or_else(|| panic!("path '{path}' not found in {json}"));
        assert_eq!(actual, &expected, "JSON path '{path}' value mismatch");

        Self {
            response: Response::from_parts(parts, Body::from(bytes)),
        }
    }

    /// The body is a failure envelope carrying `code` and a matching `status_code`
    pub async fn assert_error_code(self, code: &str) -> Self {
        let status = self.response.status().as_u16();
        self.assert_json_path("status_code", status.into())
            .await
            .assert_json_path("error.code", code.into())
            .await
    }

    pub fn response(self) -> Response {
        self.response
    }

    async fn into_parts(self) -> (axum::http::response::Parts, Vec<u8>) {
        let (parts, body) = self.response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec();
        (parts, bytes)
    }
}

fn json_path_get<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(json, |current, part| match part.parse::<usize>() {
        Ok(index) => current.get(index),
        Err(_) => current.get(part),
    })
}

pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::GET).uri(uri)
}

pub fn post(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::POST).uri(uri)
}

pub fn put(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::PUT).uri(uri)
}

pub fn delete(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::DELETE).uri(uri)
}

pub fn patch(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::PATCH).uri(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WharfError;
    use crate::http::Envelope;
    use axum::routing::get as axum_get;
    use serde_json::json;

    fn app() -> Router {
        Router::new()
            .route(
                "/hello",
                axum_get(|| async { Envelope::ok(json!({"items": ["a", "b"]})) }),
            )
            .route(
                "/missing",
                axum_get(|| async { Err::<Envelope, _>(WharfError::not_found("nope")) }),
            )
    }

    #[tokio::test]
    async fn json_paths_walk_objects_and_arrays() {
        get(app(), "/hello")
            .execute()
            .await
            .assert_ok()
            .assert_json_path("data.items.1", json!("b"))
            .await
            .assert_json_path("status_code", json!(200))
            .await;
    }

    #[tokio::test]
    async fn error_envelope_assertion() {
        get(app(), "/missing")
            .execute()
            .await
            .assert_not_found()
            .assert_error_code("not_found")
            .await
            .assert_json_path("error.message", json!("nope"))
            .await;
    }

    #[test]
    fn path_lookup_misses_cleanly() {
        let value = json!({"a": {"b": [1]}});
        assert_eq!(json_path_get(&value, "a.b.0"), Some(&json!(1)));
        assert_eq!(json_path_get(&value, "a.c"), None);
        assert_eq!(json_path_get(&value, "a.b.3"), None);
    }
}
