// crates/interceptor/src/error.rs
//! Error types for network emulation

use thiserror::Error;

/// Result type for emulated network operations
pub type EmulationResult<T> = Result<T, EmulationError>;

/// Errors surfaced to transactions by the emulation layer.
///
/// The interceptor itself has no failure modes; these are the policy
/// outcomes a host reports through a transaction's own error channel.
#[derive(Debug, Error)]
pub enum EmulationError {
    /// The emulated network is offline
    #[error("Internet connection is emulated as disconnected")]
    InternetDisconnected,
}
