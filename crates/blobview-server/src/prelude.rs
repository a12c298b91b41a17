//! Prelude module for convenient imports.

pub use crate::handler::routes;
pub use crate::middleware::{
    RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
pub use crate::service::{ServiceConfig, ServiceState};
pub use crate::{Error, ErrorKind, Result};
