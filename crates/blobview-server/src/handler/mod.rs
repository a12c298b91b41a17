//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use blobview_server::handler::routes;
//! use blobview_server::service::{ServiceConfig, ServiceState};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config)?;
//! let app: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod content;
mod error;
mod monitors;
mod request;
mod response;
mod viewer;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{MonitorStatus, ServiceStatus};
use crate::service::{SESSION_COOKIE, ServiceState};

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns the id carried by the session cookie, if it is well formed.
fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Returns a [`Router`] with all routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(viewer::routes())
        .merge(content::routes())
        .merge(monitors::routes())
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::Router;
    use axum_test::TestServer;
    use blobview_storage::{MemoryConnector, MemoryContainer};

    use crate::handler::routes;
    use crate::service::{ServiceConfig, ServiceState};

    /// Image names stored in the fixture container.
    pub const FIXTURE_NAMES: [&str; 7] = [
        "a.png", "b.jpg", "c.gif", "d.bmp", "e.webp", "f.tiff", "notes.txt",
    ];

    /// Returns a config whose defaults point at the fixture container.
    pub fn test_config() -> ServiceConfig {
        ServiceConfig {
            azure_container: Some("photos".to_owned()),
            azure_account_url: Some("http://127.0.0.1:10000".to_owned()),
            default_page_size: 3,
            ..ServiceConfig::default()
        }
    }

    /// Returns state backed by an in-memory `photos` container.
    pub async fn create_test_state() -> (ServiceState, MemoryContainer) {
        let container = MemoryContainer::new("memory://photos");
        for name in FIXTURE_NAMES {
            container.insert(name, name.as_bytes().to_vec()).await;
        }

        let connector = MemoryConnector::new().with_container("photos", container.clone());
        let state = ServiceState::with_connector(&test_config(), Arc::new(connector));
        (state, container)
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let server = TestServer::new(router.with_state(state))?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router and fixture state.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        let (state, _) = create_test_state().await;
        create_test_server_with_state(routes(), state)
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/missing").await;
        assert_eq!(response.status_code().as_u16(), 404);

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
