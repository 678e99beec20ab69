use crate::{
    app::AppContext,
    compression::build_compression_layer,
    config::Config,
    cors::build_cors_layer,
    error::{Result, WharfError},
    http::RouteModule,
    middleware::{MakeRequestUuid, no_store, panic_response},
    ratelimit::build_rate_limit_layer,
    request_logging::build_request_logging_layer,
    routes::{SystemRoutes, V1Routes},
    security::build_security_headers_layer,
    timeout::build_timeout_layer,
    websocket::WebSocketRoutes,
};
use axum::{Router, extract::DefaultBodyLimit};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Upper bound on draining in-flight requests after a shutdown signal
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// A wharf HTTP service: routes, shared context and the middleware stack
pub struct App {
    router: Router<AppContext>,
    config: Config,
    context: AppContext,
    /// Routers that already carry their own state, merged after `with_state`
    extra_routers: Vec<Router>,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// The context is derived from `config` until replaced by
    /// [`with_context`](Self::with_context).
    pub fn with_config(config: Config) -> Self {
        let context = AppContext::from_config(config.clone());
        Self {
            router: Router::new(),
            config,
            context,
            extra_routers: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: AppContext) -> Self {
        self.context = context;
        self
    }

    /// Mount `/`, `/api/health`, `/api/v1/*` and `/ws`.
    ///
    /// Call after [`with_context`](Self::with_context): the v1 routes capture
    /// the context's token verifier.
    pub fn with_default_routes(self) -> Self {
        let jwt = self.context.jwt();
        self.register_module(SystemRoutes)
            .register_module(V1Routes::new(jwt))
            .register_module(WebSocketRoutes::default())
    }

    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    /// Merge a router whose state is already provided
    pub fn merge_router(mut self, router: Router) -> Self {
        self.extra_routers.push(router);
        self
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Final router with state applied and the full middleware stack.
    ///
    /// Outermost first: panic recovery, body limit, timeout, security
    /// headers, compression, rate limit, CORS, request id, trace, request
    /// logging, and in development `Cache-Control: no-store`.
    pub fn into_router(self) -> Result<Router> {
        let config = self.config;
        let mut router = self.router.with_state(self.context);
        for extra in self.extra_routers {
            router = router.merge(extra);
        }

        // Layers wrap from the inside out: the last one added runs first.
        if !config.is_prod {
            router = router.layer(axum::middleware::from_fn(no_store));
        }

        if let Some(logging_layer) = build_request_logging_layer(&config.request_logging) {
            router = router.layer(logging_layer);
        }

        router = router
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        if let Some(cors_layer) = build_cors_layer(&config.cors, config.is_prod)? {
            router = router.layer(cors_layer);
        }

        if let Some(rate_limit_layer) = build_rate_limit_layer(&config.rate_limit) {
            router = router.layer(rate_limit_layer);
        }

        if let Some(compression_layer) = build_compression_layer(&config.compression) {
            router = router.layer(compression_layer);
        }

        if let Some(security_layer) = build_security_headers_layer(&config.security) {
            router = router.layer(security_layer);
        }

        if let Some(timeout_layer) = build_timeout_layer(&config.timeout) {
            router = router.layer(timeout_layer);
        }

        router = router
            .layer(DefaultBodyLimit::max(config.server.max_body_size))
            .layer(CatchPanicLayer::custom(panic_response));

        Ok(router)
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.addr().map_err(|e| {
            WharfError::internal(format!("invalid server address: {e}"))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| WharfError::internal(format!("failed to bind {addr}: {e}")))?;

        tracing::info!(%addr, "server listening");
        self.serve_with(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `signal` resolves.
    ///
    /// On the signal every websocket is closed, then in-flight requests get
    /// [`SHUTDOWN_TIMEOUT`] to finish.
    pub async fn serve_with<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let registry = self.context.registry();
        let router = self.into_router()?;

        let (stopping_tx, mut stopping_rx) = tokio::sync::watch::channel(false);
        let shutdown = async move {
            signal.await;
            let closed = registry.close_all().await;
            tracing::info!(closed, "closed websocket connections, draining requests");
            let _ = stopping_tx.send(true);
        };

        let server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .into_future();

        let drain_deadline = async move {
            if stopping_rx.wait_for(|stopping| *stopping).await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(SHUTDOWN_TIMEOUT).await;
        };

        tokio::select! {
            result = server => {
                result.map_err(|e| WharfError::internal(format!("server error: {e}")))?;
                tracing::info!("shutdown complete");
            }
            _ = drain_deadline => {
                tracing::warn!(
                    timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                    "graceful shutdown timed out, dropping remaining requests"
                );
            }
        }

        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, starting graceful shutdown"),
        _ = terminate => tracing::info!("received SIGTERM, starting graceful shutdown"),
    }
}
