//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Security (headers, body limits, compression)
//! - Observability (request ids, tracing spans, request metrics)
//! - Recovery (panics, timeouts)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use blobview_server::middleware::{
//!     RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//!     SecurityHeadersConfig,
//! };
//!
//! let app: Router = Router::new()
//!     .with_security(&SecurityHeadersConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod observability;
mod recovery;
mod route_category;
mod security;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use route_category::RouteCategory;
pub use security::{
    DEFAULT_MAX_BODY_SIZE, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
