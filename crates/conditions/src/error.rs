// crates/conditions/src/error.rs
//! Error types for network condition descriptions

use thiserror::Error;

/// Result type for condition construction and validation
pub type ConditionsResult<T> = Result<T, ConditionsError>;

/// Errors that can occur when describing network conditions
#[derive(Debug, Error)]
pub enum ConditionsError {
    /// Throttling was requested without a usable bandwidth ceiling
    #[error("Throttled conditions require a positive download throughput")]
    InvalidThroughput,
}
