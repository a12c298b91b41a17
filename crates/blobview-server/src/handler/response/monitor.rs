//! Monitor response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceStatus {
    /// Serving requests.
    Healthy,
}

/// System monitoring status response.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// Overall system health status.
    pub status: ServiceStatus,
    /// Application version.
    pub version: String,
    /// Number of live viewer sessions.
    pub active_sessions: usize,
    /// Number of cached images.
    pub cached_items: usize,
}

impl MonitorStatus {
    /// Creates a healthy status with the given counters.
    pub fn healthy(active_sessions: usize, cached_items: usize) -> Self {
        Self {
            checked_at: Timestamp::now(),
            status: ServiceStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_owned(),
            active_sessions,
            cached_items,
        }
    }
}
