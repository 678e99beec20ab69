//! Rate limiting layer backed by governor
//!
//! GCRA limiter: `max_requests` may burst at once, then cells replenish
//! evenly across the window. Per-IP limiting uses governor's keyed store,
//! pruned periodically so idle clients do not accumulate.

use super::config::{RateLimitConfig, RateLimitStrategy};
use crate::error::ErrorCode;
use crate::http::error_response;
use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderValue, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    state::{InMemoryState, NotKeyed},
};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    task::{Context, Poll},
    time::Duration,
};
use tower::{Layer, Service};

const PRUNE_INTERVAL: u64 = 1000;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later";

type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;
type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

#[derive(Clone)]
enum Limiter {
    Global(Arc<GlobalLimiter>),
    PerIp(Arc<KeyedLimiter>),
}

#[derive(Clone)]
struct RateLimitState {
    limiter: Limiter,
    clock: DefaultClock,
    config: Arc<RateLimitConfig>,
    checks: Arc<AtomicU64>,
}

fn quota_for(config: &RateLimitConfig) -> Quota {
    let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
    let window = Duration::from_secs(config.window_seconds.max(1));
    Quota::with_period(window / burst.get())
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

impl RateLimitState {
    fn new(config: RateLimitConfig) -> Self {
        let quota = quota_for(&config);
        let limiter = match config.strategy {
            RateLimitStrategy::PerIp => Limiter::PerIp(Arc::new(RateLimiter::keyed(quota))),
            RateLimitStrategy::Global => Limiter::Global(Arc::new(RateLimiter::direct(quota))),
        };

        Self {
            limiter,
            clock: DefaultClock::default(),
            config: Arc::new(config),
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// `Err` carries the Retry-After delay in whole seconds
    fn check(&self, ip: Option<IpAddr>) -> Result<(), u64> {
        let outcome = match &self.limiter {
            Limiter::PerIp(limiter) => {
                let count = self.checks.fetch_add(1, Ordering::Relaxed);
                if count > 0 && count % PRUNE_INTERVAL == 0 {
                    limiter.retain_recent();
                }
                // Without a peer address there is no bucket to charge.
                let Some(ip) = ip else { return Ok(()) };
                limiter.check_key(&ip)
            }
            Limiter::Global(limiter) => limiter.check(),
        };

        outcome.map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            wait.as_secs().max(1)
        })
    }

    fn client_ip(&self, req: &Request) -> Option<IpAddr> {
        if self.config.trust_proxy {
            let forwarded = req
                .headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse().ok());
            let real_ip = || {
                req.headers()
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse().ok())
            };
            if let Some(ip) = forwarded.or_else(real_ip) {
                return Some(ip);
            }
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    }
}

/// 429 envelope with a Retry-After header
pub fn rate_limited_response(retry_after: u64) -> Response {
    let mut response = error_response(ErrorCode::RateLimitExceeded, RATE_LIMIT_MESSAGE);
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

/// Tower layer for rate limiting
#[derive(Clone)]
pub struct RateLimitLayer {
    state: RateLimitState,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            state: RateLimitState::new(config),
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: RateLimitState,
}

impl<S> Service<Request> for RateLimitService<S>
where
    S: Service<Request> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        if !self.state.config.is_exempt(req.uri().path()) {
            let ip = self.state.client_ip(&req);
            if let Err(retry_after) = self.state.check(ip) {
                tracing::debug!(ip = ?ip, retry_after, "rate limit exceeded");
                return Box::pin(async move { Ok(rate_limited_response(retry_after)) });
            }
        }

        // Keep the readied service for this call and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { Ok(inner.call(req).await?.into_response()) })
    }
}

/// Build a rate limit layer, or `None` when disabled
pub fn build_rate_limit_layer(config: &RateLimitConfig) -> Option<RateLimitLayer> {
    config.enabled.then(|| RateLimitLayer::new(config.clone()))
}
