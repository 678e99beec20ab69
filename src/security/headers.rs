use super::config::SecurityConfig;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, Response, header},
};
use futures::future::BoxFuture;
use std::sync::Arc;
use tower::Service;

/// Build a layer that stamps security headers on every response
pub fn build_security_headers_layer(config: &SecurityConfig) -> Option<SecurityHeadersLayer> {
    config.enabled.then(|| SecurityHeadersLayer {
        headers: Arc::new(render_headers(config)),
    })
}

/// Precompute the header set once; the service only copies it.
fn render_headers(config: &SecurityConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let mut put = |name: HeaderName, value: &str| match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "skipping invalid security header value"),
    };

    if let Some(value) = &config.xss_protection {
        put(header::X_XSS_PROTECTION, value);
    }
    if config.nosniff {
        put(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    }
    if let Some(frame) = config.x_frame_options {
        put(header::X_FRAME_OPTIONS, frame.as_str());
    }
    if let Some(policy) = config.referrer_policy {
        put(header::REFERRER_POLICY, policy.as_str());
    }
    if let Some(hsts) = config.hsts_value() {
        put(header::STRICT_TRANSPORT_SECURITY, &hsts);
    }
    if let Some(csp) = &config.content_security_policy {
        put(header::CONTENT_SECURITY_POLICY, csp);
    }
    if let Some(coep) = &config.cross_origin_embedder_policy {
        put(HeaderName::from_static("cross-origin-embedder-policy"), coep);
    }
    if let Some(coop) = &config.cross_origin_opener_policy {
        put(HeaderName::from_static("cross-origin-opener-policy"), coop);
    }
    if let Some(corp) = &config.cross_origin_resource_policy {
        put(HeaderName::from_static("cross-origin-resource-policy"), corp);
    }

    headers
}

/// Tower layer that adds security headers
#[derive(Clone)]
pub struct SecurityHeadersLayer {
    headers: Arc<HeaderMap>,
}

impl<S> tower::Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersService {
            inner,
            headers: self.headers.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SecurityHeadersService<S> {
    inner: S,
    headers: Arc<HeaderMap>,
}

impl<S> Service<Request> for SecurityHeadersService<S>
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
        let headers = self.headers.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.await?;
            for (name, value) in headers.iter() {
                response.headers_mut().insert(name.clone(), value.clone());
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_builds_nothing() {
        let config = SecurityConfig::builder().enabled(false).build();
        assert!(build_security_headers_layer(&config).is_none());
    }

    #[test]
    fn default_header_set() {
        let headers = render_headers(&SecurityConfig::default());

        assert_eq!(headers["x-xss-protection"], "1; mode=block");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert_eq!(headers["strict-transport-security"], "max-age=31536000");
        assert_eq!(headers["content-security-policy"], "default-src 'self'");
        assert_eq!(headers["cross-origin-embedder-policy"], "require-corp");
        assert_eq!(headers["cross-origin-opener-policy"], "same-origin");
        assert_eq!(headers["cross-origin-resource-policy"], "cross-origin");
    }

    #[test]
    fn optional_headers_can_be_dropped() {
        let config = SecurityConfig::builder()
            .content_security_policy(None)
            .x_frame_options(None)
            .hsts_max_age(0)
            .build();
        let headers = render_headers(&config);

        assert!(!headers.contains_key("content-security-policy"));
        assert!(!headers.contains_key("x-frame-options"));
        assert!(!headers.contains_key("strict-transport-security"));
        assert!(headers.contains_key("x-content-type-options"));
    }
}
