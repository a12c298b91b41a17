//! Viewer page handlers.
//!
//! `GET /` re-renders the session's current page. `POST /` applies the
//! submitted settings first and then performs the requested paging action.
//! Both respond with the full HTML page and (re)issue the session cookie.

use axum::Router;
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use super::request::ViewerForm;
use super::session_id;
use crate::service::{Navigation, SESSION_COOKIE, ServiceState, SessionStore, Viewer};
use crate::view;

/// Tracing target for viewer operations.
const TRACING_TARGET: &str = "blobview_server::handler::viewer";

#[tracing::instrument(skip_all)]
async fn show_page(
    State(session_store): State<SessionStore>,
    State(viewer): State<Viewer>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    render(&session_store, &viewer, jar, None).await
}

#[tracing::instrument(skip_all)]
async fn submit_page(
    State(session_store): State<SessionStore>,
    State(viewer): State<Viewer>,
    jar: CookieJar,
    Form(form): Form<ViewerForm>,
) -> (CookieJar, Html<String>) {
    render(&session_store, &viewer, jar, Some(form)).await
}

async fn render(
    session_store: &SessionStore,
    viewer: &Viewer,
    jar: CookieJar,
    form: Option<ViewerForm>,
) -> (CookieJar, Html<String>) {
    let (id, mut session) = session_store.acquire(session_id(&jar)).await;

    let action = match form {
        Some(form) => {
            let (update, action) = form.into_parts();
            tracing::debug!(
                target: TRACING_TARGET,
                session_id = %id,
                update = ?update,
                "Applying settings"
            );
            session.settings.apply(update);
            action
        }
        None => Navigation::Stay,
    };

    let page = viewer.render(&mut session, action).await;
    let html = view::render_page(&page, &session.settings);
    drop(session);

    (jar.add(session_cookie(id)), Html(html))
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Returns a [`Router`] with the viewer page routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/", get(show_page).post(submit_page))
}

#[cfg(test)]
mod tests {
    use crate::handler::routes;
    use crate::handler::test::{
        create_test_server, create_test_server_with_state, create_test_state,
    };
    use crate::service::SESSION_COOKIE;

    #[tokio::test]
    async fn first_visit_issues_session_cookie() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/").await;
        response.assert_status_ok();

        let cookie = response.cookie(SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));

        let html = response.text();
        assert!(html.contains("Page 1"));
        assert!(html.contains("a.png"));
        assert!(html.contains("value=\"prev\" disabled"));
        Ok(())
    }

    #[tokio::test]
    async fn next_and_prev_follow_the_session() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let first = server.get("/").await;
        let cookie = first.cookie(SESSION_COOKIE);

        let second = server
            .post("/")
            .add_cookie(cookie.clone())
            .form(&[("action", "next")])
            .await;
        let html = second.text();
        assert!(html.contains("Page 2"));
        assert!(html.contains("d.bmp"));
        assert!(!html.contains("a.png"));

        let back = server
            .post("/")
            .add_cookie(cookie)
            .form(&[("action", "prev")])
            .await;
        let html = back.text();
        assert!(html.contains("Page 1"));
        assert!(html.contains("a.png"));
        Ok(())
    }

    #[tokio::test]
    async fn sessions_page_independently() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let alice = server.get("/").await.cookie(SESSION_COOKIE);
        let bob = server.get("/").await.cookie(SESSION_COOKIE);
        assert_ne!(alice.value(), bob.value());

        server
            .post("/")
            .add_cookie(alice)
            .form(&[("action", "next")])
            .await
            .assert_status_ok();

        let html = server.get("/").add_cookie(bob).await.text();
        assert!(html.contains("Page 1"));
        Ok(())
    }

    #[tokio::test]
    async fn settings_change_resets_to_first_page() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let cookie = server.get("/").await.cookie(SESSION_COOKIE);

        server
            .post("/")
            .add_cookie(cookie.clone())
            .form(&[("action", "next")])
            .await
            .assert_status_ok();

        let html = server
            .post("/")
            .add_cookie(cookie)
            .form(&[("action", "apply"), ("prefix", "e"), ("page_size", "3")])
            .await
            .text();

        assert!(html.contains("Page 1"));
        assert!(html.contains("e.webp"));
        assert!(!html.contains("d.bmp"));
        Ok(())
    }

    #[tokio::test]
    async fn listing_failure_is_shown_and_paging_kept() -> anyhow::Result<()> {
        let (state, container) = create_test_state().await;
        let server = create_test_server_with_state(routes(), state)?;
        let cookie = server.get("/").await.cookie(SESSION_COOKIE);

        container.fail_next_listings(1);
        let html = server
            .post("/")
            .add_cookie(cookie.clone())
            .form(&[("action", "next")])
            .await
            .text();
        assert!(html.contains("Failed to list blobs"));
        assert!(html.contains("Page 1"));

        let html = server
            .post("/")
            .add_cookie(cookie)
            .form(&[("action", "next")])
            .await
            .text();
        assert!(html.contains("Page 2"));
        Ok(())
    }

    #[tokio::test]
    async fn submitted_secrets_are_not_echoed() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let html = server
            .post("/")
            .form(&[("action", "apply"), ("sas_token", "sv=2024&sig=hunter2")])
            .await
            .text();

        assert!(!html.contains("hunter2"));
        assert!(html.contains("stored, leave blank to keep"));
        Ok(())
    }
}
