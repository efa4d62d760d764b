// crates/interceptor/src/lib.rs
//! Throttle interceptor simulating constrained network conditions
//!
//! This crate provides the engine behind a network-conditions emulator:
//! - A virtual packet clock with fair round-robin byte distribution
//! - Offline emulation that fails eligible transactions
//! - A non-owning registry of supervised transactions
//!
//! # Example
//!
//! ```rust
//! use slowwire_conditions::presets;
//! use slowwire_interceptor::NetworkInterceptor;
//! use std::sync::Arc;
//!
//! let interceptor = NetworkInterceptor::new();
//! interceptor.update_conditions(Arc::new(presets::offline()));
//! assert!(interceptor.conditions().offline());
//! ```

mod error;
mod interceptor;
mod timer;
mod transaction;

pub use error::{EmulationError, EmulationResult};
pub use interceptor::{NetworkInterceptor, WeakNetworkInterceptor};
pub use transaction::{NetworkTransaction, TransactionId, TransactionRef};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        // Verify all types are exported
        let interceptor = NetworkInterceptor::new();
        let _: WeakNetworkInterceptor = interceptor.downgrade();
        let _: TransactionId = TransactionId::new();
        let _: EmulationError = EmulationError::InternetDisconnected;
    }
}
