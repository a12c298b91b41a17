//! Core error types.

/// Result type for core operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while validating core types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested page size is outside the supported range.
    #[error("page size {value} is out of range, expected {min}..={max}")]
    PageSizeOutOfRange {
        /// Requested value.
        value: u32,
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },
}
