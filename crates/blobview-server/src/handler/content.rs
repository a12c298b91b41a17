//! Image content handler.
//!
//! The grid references images through this route rather than through storage
//! URLs, so credentials stay on the server. Content is fetched with the
//! requesting session's settings and served from the shared cache.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::cookie::CookieJar;
use blobview_core::{content_type_for, is_image_name};

use super::session_id;
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceState, SessionStore, Viewer};

/// Tracing target for content operations.
const TRACING_TARGET: &str = "blobview_server::handler::content";

/// Browser cache policy for served images.
const CACHE_CONTROL: &str = "private, max-age=300";

#[tracing::instrument(skip_all)]
async fn blob_content(
    State(session_store): State<SessionStore>,
    State(viewer): State<Viewer>,
    jar: CookieJar,
    Path(name): Path<String>,
) -> Result<Response> {
    if !is_image_name(&name) {
        return Err(ErrorKind::NotFound
            .with_message("Only image blobs are served")
            .with_resource("blob"));
    }

    let session_id = session_id(&jar).ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("Viewer session not found")
            .with_resource("session")
    })?;

    let store = {
        let session = session_store.find(session_id).await.ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Viewer session expired")
                .with_resource("session")
        })?;
        viewer.connect(&session)?
    };

    let content = viewer
        .content_cache()
        .get_or_fetch(store.as_ref(), &name)
        .await?;

    tracing::trace!(
        target: TRACING_TARGET,
        container = %store.identity(),
        blob = %name,
        size = content.len(),
        "Serving blob content"
    );

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&name)),
        (header::CACHE_CONTROL, CACHE_CONTROL),
    ];
    Ok((headers, content).into_response())
}

/// Returns a [`Router`] with the content route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/content/{*name}", get(blob_content))
}

#[cfg(test)]
mod tests {
    use crate::handler::routes;
    use crate::handler::test::{
        create_test_server, create_test_server_with_state, create_test_state,
    };
    use crate::service::SESSION_COOKIE;

    #[tokio::test]
    async fn serves_listed_image_with_mime_type() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let cookie = server.get("/").await.cookie(SESSION_COOKIE);

        let response = server.get("/content/b.jpg").add_cookie(cookie).await;
        response.assert_status_ok();

        assert_eq!(response.header("content-type"), "image/jpeg");
        assert_eq!(response.as_bytes().to_vec(), b"b.jpg".to_vec());
        Ok(())
    }

    #[tokio::test]
    async fn requires_a_session() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/content/a.png").await;
        assert_eq!(response.status_code().as_u16(), 404);
        Ok(())
    }

    #[tokio::test]
    async fn refuses_non_image_names() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let cookie = server.get("/").await.cookie(SESSION_COOKIE);

        let response = server.get("/content/notes.txt").add_cookie(cookie).await;
        assert_eq!(response.status_code().as_u16(), 404);
        Ok(())
    }

    #[tokio::test]
    async fn read_failure_is_bad_gateway() -> anyhow::Result<()> {
        let (state, container) = create_test_state().await;
        container.fail_reads_of("c.gif").await;
        let server = create_test_server_with_state(routes(), state)?;
        let cookie = server.get("/").await.cookie(SESSION_COOKIE);

        let response = server.get("/content/c.gif").add_cookie(cookie).await;
        assert_eq!(response.status_code().as_u16(), 502);
        Ok(())
    }

    #[tokio::test]
    async fn cached_private_content_stays_with_its_credentials() -> anyhow::Result<()> {
        let (state, container) = create_test_state().await;
        container.make_private();
        let server = create_test_server_with_state(routes(), state)?;

        let signed = server
            .post("/")
            .form(&[("action", "apply"), ("sas_token", "sv=2024&sig=good")])
            .await
            .cookie(SESSION_COOKIE);
        let response = server.get("/content/a.png").add_cookie(signed).await;
        response.assert_status_ok();
        assert_eq!(response.as_bytes().to_vec(), b"a.png".to_vec());

        let anonymous = server.get("/").await.cookie(SESSION_COOKIE);
        let response = server.get("/content/a.png").add_cookie(anonymous).await;
        assert_eq!(response.status_code().as_u16(), 502);
        assert_ne!(response.as_bytes().to_vec(), b"a.png".to_vec());
        Ok(())
    }
}
