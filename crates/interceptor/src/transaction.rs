// crates/interceptor/src/transaction.rs
//! Transaction contract consumed by the interceptor

use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a supervised transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the TransactionId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a supervised transaction
pub type TransactionRef = Arc<dyn NetworkTransaction>;

/// Interceptor-facing surface of a network transaction.
///
/// The interceptor never owns transactions: it keeps weak references and
/// tolerates a transaction disappearing at any point, including
/// mid-throttle. Hosts register a transaction when its transfer starts
/// and must remove it explicitly when the transfer ends.
///
/// The accessors take `&self` (implementations use interior mutability)
/// and are invoked with interceptor state borrowed, so they must not call
/// back into the interceptor. `fail` and `fire_throttled_callback` are
/// always dispatched with no interceptor state held and may synchronously
/// re-enter any interceptor operation.
pub trait NetworkTransaction: Send + Sync {
    /// Stable identity used to key the interceptor's registry
    fn id(&self) -> TransactionId;

    /// Initiator tag; empty for requests not originating from page script
    fn request_initiator(&self) -> &str;

    /// True once the transaction has failed
    fn failed(&self) -> bool;

    /// True while a request is outstanding
    fn has_request(&self) -> bool;

    /// Remaining bytes that must be virtually delivered before the
    /// transaction is unblocked
    fn throttled_byte_count(&self) -> i64;

    /// Credits `bytes` of virtual delivery against the remaining debt
    fn decrease_throttled_byte_count(&self, bytes: i64);

    /// Terminates the transaction with an error on its own error channel
    fn fail(&self);

    /// Signals that the transaction has been released from the throttle
    /// queue
    fn fire_throttled_callback(&self);
}
