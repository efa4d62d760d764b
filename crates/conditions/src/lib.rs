// crates/conditions/src/lib.rs
//! Network condition descriptions for traffic emulation
//!
//! This crate provides the policy value type consumed by the throttle
//! interceptor:
//! - Offline and bandwidth-limited condition descriptions
//! - Named presets matching common connection profiles
//! - Serde support for protocol-style JSON payloads
//!
//! # Example
//!
//! ```rust
//! use slowwire_conditions::{presets, NetworkConditions};
//!
//! let conditions = NetworkConditions::throttled(51_200).unwrap();
//! assert!(conditions.is_throttling());
//!
//! let offline = presets::offline();
//! assert!(offline.offline());
//! assert!(!offline.is_throttling());
//! ```

mod conditions;
mod error;
pub mod presets;

pub use conditions::NetworkConditions;
pub use error::{ConditionsError, ConditionsResult};
