//! Security middleware for HTTP request protection.
//!
//! Sets security headers, limits request bodies and compresses responses.
//! The viewer is same-origin only, so no CORS layer is installed.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{self, HeaderValue};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Tracing target for security middleware.
const TRACING_TARGET: &str = "blobview_server::middleware::security";

/// Maximum request body size. Only the settings form is ever posted.
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers security middlewares with the provided header configuration.
    fn with_security(self, headers: &SecurityHeadersConfig) -> Self;

    /// Layers security middlewares with default configuration.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, headers: &SecurityHeadersConfig) -> Self {
        let mut router = self
            .layer(DefaultBodyLimit::max(DEFAULT_MAX_BODY_SIZE))
            .layer(RequestBodyLimitLayer::new(DEFAULT_MAX_BODY_SIZE))
            .layer(CompressionLayer::new())
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static(headers.frame_options.as_str()),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::REFERRER_POLICY,
                HeaderValue::from_static(headers.referrer_policy.as_str()),
            ));

        match HeaderValue::from_str(&headers.hsts_header_value()) {
            Ok(value) => {
                router = router.layer(SetResponseHeaderLayer::overriding(
                    header::STRICT_TRANSPORT_SECURITY,
                    value,
                ));
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Skipping invalid HSTS header"
                );
            }
        }

        if let Some(csp) = headers.content_security_policy.as_deref() {
            match HeaderValue::from_str(csp) {
                Ok(value) => {
                    router = router.layer(SetResponseHeaderLayer::overriding(
                        header::CONTENT_SECURITY_POLICY,
                        value,
                    ));
                }
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %err,
                        "Skipping invalid CSP header"
                    );
                }
            }
        }

        router
    }

    fn with_default_security(self) -> Self {
        self.with_security(&SecurityHeadersConfig::default())
    }
}

/// Security headers configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    /// HSTS max age in seconds. Forces browsers to use HTTPS for this duration.
    pub hsts_max_age_seconds: u64,

    /// Whether to include subdomains in HSTS policy.
    pub hsts_include_subdomains: bool,

    /// Content Security Policy directives controlling resource loading.
    pub content_security_policy: Option<String>,

    /// X-Frame-Options value protecting against clickjacking.
    pub frame_options: FrameOptions,

    /// Referrer-Policy controlling referrer information in requests.
    pub referrer_policy: ReferrerPolicy,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        // The page ships no scripts and only an inline style block.
        Self {
            hsts_max_age_seconds: 31_536_000,
            hsts_include_subdomains: true,
            content_security_policy: Some(
                "default-src 'none'; \
                 style-src 'unsafe-inline'; \
                 img-src 'self'; \
                 frame-ancestors 'none'; \
                 base-uri 'none'; \
                 form-action 'self'"
                    .to_owned(),
            ),
            frame_options: FrameOptions::Deny,
            referrer_policy: ReferrerPolicy::NoReferrer,
        }
    }
}

impl SecurityHeadersConfig {
    /// Returns the HSTS header value as a string.
    pub fn hsts_header_value(&self) -> String {
        if self.hsts_include_subdomains {
            format!("max-age={}; includeSubDomains", self.hsts_max_age_seconds)
        } else {
            format!("max-age={}", self.hsts_max_age_seconds)
        }
    }
}

/// X-Frame-Options header values controlling frame embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOptions {
    /// The page cannot be displayed in a frame, regardless of the site.
    Deny,
    /// The page can only be displayed in a frame on the same origin.
    SameOrigin,
}

impl FrameOptions {
    /// Returns the header value string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// Referrer-Policy header values controlling referrer information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferrerPolicy {
    /// No referrer information is sent.
    NoReferrer,
    /// Sends only the origin as the referrer.
    Origin,
    /// Sends full URL for same-origin, only origin for cross-origin.
    StrictOriginWhenCrossOrigin,
}

impl ReferrerPolicy {
    /// Returns the header value string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::Origin => "origin",
            Self::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::{get, post};
    use axum_test::TestServer;

    use super::*;

    async fn echo_len(body: String) -> String {
        body.len().to_string()
    }

    #[test]
    fn hsts_header_value() {
        let mut config = SecurityHeadersConfig::default();
        assert_eq!(
            config.hsts_header_value(),
            "max-age=31536000; includeSubDomains"
        );

        config.hsts_include_subdomains = false;
        assert_eq!(config.hsts_header_value(), "max-age=31536000");
    }

    #[tokio::test]
    async fn responses_carry_security_headers() -> anyhow::Result<()> {
        let app: Router = Router::new()
            .route("/", get(|| async { "ok" }))
            .with_default_security();
        let server = TestServer::new(app)?;

        let response = server.get("/").await;
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert_eq!(response.header("x-content-type-options"), "nosniff");
        assert_eq!(response.header("referrer-policy"), "no-referrer");

        let csp = response.header("content-security-policy");
        assert!(csp.to_str()?.contains("img-src 'self'"));
        Ok(())
    }

    #[tokio::test]
    async fn oversized_form_is_rejected() -> anyhow::Result<()> {
        let app: Router = Router::new()
            .route("/", post(echo_len))
            .with_default_security();
        let server = TestServer::new(app)?;

        let response = server
            .post("/")
            .text("x".repeat(DEFAULT_MAX_BODY_SIZE + 1))
            .await;
        assert_eq!(response.status_code().as_u16(), 413);
        Ok(())
    }
}
