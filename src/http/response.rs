use crate::error::ErrorCode;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Standard JSON envelope returned by every endpoint
///
/// ```json
/// {"status_code": 200, "message": "Service is operational"}
/// {"status_code": 401, "error": {"code": "unauthorized", "message": "..."}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error half of the envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// 200 with data
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn with_status(status: StatusCode, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Envelope carrying only a message
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(status: StatusCode, error: ErrorBody) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            message: None,
            error: Some(error),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }
}

/// Build an error envelope response outside the `WharfError` path, for
/// middleware that answers before a handler runs
pub fn error_response(code: ErrorCode, message: impl Into<String>) -> Response {
    Envelope::<()>::failure(code.status(), ErrorBody::new(code, message)).into_response()
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn data_envelope_omits_absent_fields() {
        let response = Envelope::ok(serde_json::json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"status_code": 200, "data": {"id": 1}}));
    }

    #[tokio::test]
    async fn message_envelope_uses_given_status() {
        let response =
            Envelope::<()>::message(StatusCode::ACCEPTED, "queued").into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let json = body_json(response).await;
        assert_eq!(json["status_code"], 202);
        assert_eq!(json["message"], "queued");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn error_response_matches_code_status() {
        let response = error_response(ErrorCode::RateLimitExceeded, "slow down");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "rate_limit_exceeded");
        assert_eq!(json["error"]["message"], "slow down");
    }

    #[test]
    fn envelope_deserializes_for_clients() {
        let raw = r#"{"status_code":501,"error":{"code":"not_implemented","message":"later"}}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.data.is_none());
        let error = envelope.error.unwrap();
        assert_eq!(error.code, ErrorCode::NotImplemented);
        assert_eq!(error.message, "later");
    }
}
