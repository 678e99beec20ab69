//! In-process HTTP scenarios for wharf routers
//!
//! Requests go straight through the router with `tower::ServiceExt::oneshot`,
//! no socket involved.
//!
//! ```rust,ignore
//! use wharf::{App, testing};
//!
//! #[tokio::test]
//! async fn root_is_operational() {
//!     let app = App::new().with_default_routes().into_router().unwrap();
//!
//!     testing::get(app, "/")
//!         .execute()
//!         .await
//!         .assert_ok()
//!         .assert_json_path("message", "Service is operational".into())
//!         .await;
//! }
//! ```

mod scenario;

pub use scenario::{Scenario, ScenarioAssert, delete, get, patch, post, put};
