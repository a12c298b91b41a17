//! Response types for HTTP handlers.

mod error_response;
mod monitor;

pub use error_response::ErrorResponse;
pub use monitor::{MonitorStatus, ServiceStatus};
