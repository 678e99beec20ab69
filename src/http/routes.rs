use crate::app::AppContext;
use axum::Router;

/// A group of routes mounted into the [`App`](crate::App)
///
/// Handlers take `State<AppContext>`; state is applied once by the app, so
/// modules return an unstated `Router<AppContext>`.
///
/// ```ignore
/// struct StatusRoutes;
///
/// impl RouteModule for StatusRoutes {
///     fn routes(&self) -> Router<AppContext> {
///         Router::new().route("/status", get(status))
///     }
///
///     fn prefix(&self) -> Option<&str> {
///         Some("/api")
///     }
/// }
/// ```
pub trait RouteModule {
    fn routes(&self) -> Router<AppContext>;

    /// Path prefix the routes are nested under
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Merge (or nest, when a prefix is set) this module into `router`
    fn register(self, router: Router<AppContext>) -> Router<AppContext>
    where
        Self: Sized,
    {
        let routes = self.routes();

        match self.prefix() {
            Some(prefix) => router.nest(prefix, routes),
            None => router.merge(routes),
        }
    }
}
