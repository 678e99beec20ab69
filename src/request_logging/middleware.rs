use super::config::{LogLevel, RequestLoggingConfig};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{Method, StatusCode},
    response::Response,
};
use futures::future::BoxFuture;
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tower::Service;

/// Build the access-log layer, or `None` when disabled
pub fn build_request_logging_layer(config: &RequestLoggingConfig) -> Option<RequestLoggingLayer> {
    config.enabled.then(|| RequestLoggingLayer {
        config: Arc::new(config.clone()),
    })
}

/// Tower layer emitting one event per completed request
#[derive(Clone)]
pub struct RequestLoggingLayer {
    config: Arc<RequestLoggingConfig>,
}

impl<S> tower::Layer<S> for RequestLoggingLayer {
    type Service = RequestLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggingService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequestLoggingService<S> {
    inner: S,
    config: Arc<RequestLoggingConfig>,
}

struct RequestLine {
    method: Method,
    path: String,
    request_id: Option<String>,
    ip: Option<String>,
}

impl<S> Service<Request> for RequestLoggingService<S>
where
    S: Service<Request, Response = Response<Body>> + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let config = self.config.clone();
        let start = Instant::now();
        let line = RequestLine {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            request_id: req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            ip: req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string()),
        };

        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = fut.await?;
            let status = response.status();
            emit(config.level_for(status), &line, status, start.elapsed().as_millis());
            Ok(response)
        })
    }
}

fn emit(level: LogLevel, line: &RequestLine, status: StatusCode, latency_ms: u128) {
    macro_rules! event {
        ($macro:ident) => {
            tracing::$macro!(
                method = %line.method,
                path = %line.path,
                status = status.as_u16(),
                latency_ms,
                request_id = line.request_id.as_deref().unwrap_or("-"),
                ip = line.ip.as_deref().unwrap_or("-"),
                "request completed"
            )
        };
    }

    match level {
        LogLevel::Trace => event!(trace),
        LogLevel::Debug => event!(debug),
        LogLevel::Info => event!(info),
        LogLevel::Warn => event!(warn),
        LogLevel::Error => event!(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use tower::ServiceExt;

    #[test]
    fn disabled_logging() {
        let config = RequestLoggingConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(build_request_logging_layer(&config).is_none());
    }

    #[tokio::test]
    async fn passes_response_through() {
        let layer = build_request_logging_layer(&RequestLoggingConfig::default()).unwrap();
        let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
