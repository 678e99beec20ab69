use crate::http::{Envelope, ErrorBody};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Machine-readable error codes surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ValidationError,
    RateLimitExceeded,
    InternalError,
    ServiceUnavailable,
    NotImplemented,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ValidationError => "validation_error",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::InternalError => "internal_error",
            Self::ServiceUnavailable => "service_unavailable",
            Self::NotImplemented => "not_implemented",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for wharf services
#[derive(Debug, thiserror::Error)]
pub enum WharfError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(String),
}

/// Error context for additional error information
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: Option<String>,
    /// Additional error details
    pub details: Option<String>,
    /// Contextual key-value pairs
    pub context: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_id(mut self, id: impl Into<String>) -> Self {
        self.error_id = Some(id.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details = Some(detail.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error with attached context
#[derive(Debug)]
pub struct ErrorWithContext {
    error: WharfError,
    context: ErrorContext,
}

impl ErrorWithContext {
    pub fn new(error: WharfError, context: ErrorContext) -> Self {
        Self { error, context }
    }

    pub fn error(&self) -> &WharfError {
        &self.error
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }
}

impl std::fmt::Display for ErrorWithContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(ref details) = self.context.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorWithContext {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<ErrorWithContext> for WharfError {
    fn from(err: ErrorWithContext) -> Self {
        err.error
    }
}

impl IntoResponse for ErrorWithContext {
    fn into_response(self) -> Response {
        self.error.into_response_with_context(Some(self.context), false)
    }
}

impl WharfError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(message: impl Into<String>, fields: BTreeMap<String, Vec<String>>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn too_many_requests(msg: impl Into<String>) -> Self {
        Self::TooManyRequests(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Attach context to this error
    pub fn with_context(self, context: ErrorContext) -> ErrorWithContext {
        ErrorWithContext::new(self, context)
    }

    /// Taxonomy code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BadRequest(_) => ErrorCode::BadRequest,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::TooManyRequests(_) => ErrorCode::RateLimitExceeded,
            Self::Internal(_) | Self::Anyhow(_) => ErrorCode::InternalError,
            #[cfg(feature = "database")]
            Self::Database(_) => ErrorCode::InternalError,
            Self::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            Self::NotImplemented(_) => ErrorCode::NotImplemented,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.code().status()
    }

    /// Message safe to show a client.
    ///
    /// Client errors carry their own message. Server errors are replaced by a
    /// generic message so internals never leak (CWE-209); the full error is
    /// logged server-side.
    pub fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::TooManyRequests(msg)
            | Self::NotImplemented(msg) => msg.clone(),
            Self::Validation { message, .. } => message.clone(),

            Self::Internal(_) | Self::Anyhow(_) => "Internal server error".to_string(),
            Self::ServiceUnavailable(_) => "Service unavailable".to_string(),
            #[cfg(feature = "database")]
            Self::Database(_) => "Internal server error".to_string(),
        }
    }

    /// Render as an envelope response.
    ///
    /// With `dev_mode` the full error text is returned even for server errors.
    pub fn into_response_with_context(self, context: Option<ErrorContext>, dev_mode: bool) -> Response {
        let status = self.status_code();
        let code = self.code();
        let context = context.unwrap_or_default();
        let error_id = context
            .error_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let message = if dev_mode {
            self.to_string()
        } else {
            self.client_message()
        };

        let mut details = serde_json::Map::new();
        if let Self::Validation { fields, .. } = &self {
            if !fields.is_empty() {
                details.insert("fields".to_string(), serde_json::json!(fields));
            }
        }
        if let Some(detail) = context.details {
            details.insert("detail".to_string(), serde_json::Value::String(detail));
        }
        if !context.context.is_empty() {
            details.insert("context".to_string(), serde_json::json!(context.context));
        }
        if status.is_server_error() {
            details.insert("error_id".to_string(), serde_json::Value::String(error_id.clone()));
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(status = status.as_u16(), code = %code, error = %self, "Request rejected");
        }

        let body = ErrorBody {
            code,
            message,
            details: (!details.is_empty()).then_some(serde_json::Value::Object(details)),
        };

        Envelope::<()>::failure(status, body).into_response()
    }
}

impl IntoResponse for WharfError {
    fn into_response(self) -> Response {
        self.into_response_with_context(None, false)
    }
}

/// Result type alias for wharf handlers
pub type Result<T> = std::result::Result<T, WharfError>;

impl From<serde_json::Error> for WharfError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            WharfError::BadRequest(format!("Invalid JSON: {}", err))
        } else {
            WharfError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for WharfError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        WharfError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(feature = "validation")]
impl From<validator::ValidationErrors> for WharfError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = crate::validation::field_messages(&errors);
        let message = fields.values().flatten().cloned().collect::<Vec<_>>().join("; ");
        WharfError::Validation { message, fields }
    }
}

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for WharfError {
    fn from(err: sea_orm::DbErr) -> Self {
        match &err {
            sea_orm::DbErr::RecordNotFound(msg) => WharfError::NotFound(if msg.is_empty() {
                "Record not found".to_string()
            } else {
                msg.clone()
            }),
            sea_orm::DbErr::Conn(inner) => {
                WharfError::Database(format!("Connection error: {}", inner))
            }
            sea_orm::DbErr::Migration(inner) => {
                WharfError::Database(format!("Migration error: {}", inner))
            }
            _ => WharfError::Database(err.to_string()),
        }
    }
}

#[cfg(feature = "cache")]
impl From<redis::RedisError> for WharfError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
            WharfError::ServiceUnavailable(format!("Redis unavailable: {}", err))
        } else {
            WharfError::Internal(format!("Redis error: {}", err))
        }
    }
}
