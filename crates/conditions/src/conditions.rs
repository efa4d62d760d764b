// crates/conditions/src/conditions.rs
//! Network condition value type

use crate::error::{ConditionsError, ConditionsResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A description of the network conditions to emulate.
///
/// Immutable value; holders replace it wholesale rather than mutating it.
/// Field names follow the protocol-style camelCase payload, so a host can
/// deserialize an emulation request directly into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConditions {
    /// Emulate a complete loss of connectivity
    offline: bool,

    /// Additional round-trip latency in milliseconds (recorded for the
    /// host; the throttle engine itself does not simulate it)
    latency: u64,

    /// Download bandwidth ceiling in bytes per second, 0 meaning unset
    download_throughput: u64,

    /// Upload bandwidth ceiling in bytes per second, 0 meaning unset
    /// (recorded for the host; the throttle engine itself does not
    /// simulate it)
    upload_throughput: u64,
}

impl NetworkConditions {
    /// Creates a full condition description
    pub fn new(
        offline: bool,
        latency_ms: u64,
        download_throughput: u64,
        upload_throughput: u64,
    ) -> Self {
        Self {
            offline,
            latency: latency_ms,
            download_throughput,
            upload_throughput,
        }
    }

    /// Creates bandwidth-limited conditions with the given download ceiling
    pub fn throttled(download_throughput: u64) -> ConditionsResult<Self> {
        if download_throughput == 0 {
            return Err(ConditionsError::InvalidThroughput);
        }

        Ok(Self {
            offline: false,
            latency: 0,
            download_throughput,
            upload_throughput: 0,
        })
    }

    /// Returns true if connectivity loss is being emulated
    pub fn offline(&self) -> bool {
        self.offline
    }

    /// Returns true if a download bandwidth ceiling applies.
    ///
    /// Offline supersedes throttling: offline conditions never throttle.
    pub fn is_throttling(&self) -> bool {
        !self.offline && self.download_throughput > 0
    }

    /// Returns the emulated round-trip latency
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency)
    }

    /// Returns the download bandwidth ceiling in bytes per second
    pub fn download_throughput(&self) -> u64 {
        self.download_throughput
    }

    /// Returns the upload bandwidth ceiling in bytes per second
    pub fn upload_throughput(&self) -> u64 {
        self.upload_throughput
    }
}

impl Default for NetworkConditions {
    /// Online with no bandwidth ceiling
    fn default() -> Self {
        Self::new(false, 0, 0, 0)
    }
}

impl std::fmt::Display for NetworkConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.offline {
            write!(f, "offline")
        } else if self.is_throttling() {
            write!(f, "throttled ({} B/s down)", self.download_throughput)
        } else {
            write!(f, "online")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_online_and_unthrottled() {
        let conditions = NetworkConditions::default();
        assert!(!conditions.offline());
        assert!(!conditions.is_throttling());
        assert_eq!(conditions.download_throughput(), 0);
    }

    #[test]
    fn test_throttled_requires_positive_throughput() {
        assert!(NetworkConditions::throttled(0).is_err());

        let conditions = NetworkConditions::throttled(1500).expect("valid throughput");
        assert!(conditions.is_throttling());
        assert_eq!(conditions.download_throughput(), 1500);
    }

    #[test]
    fn test_offline_supersedes_throttling() {
        let conditions = NetworkConditions::new(true, 0, 1500, 0);
        assert!(conditions.offline());
        assert!(!conditions.is_throttling());
    }

    #[test]
    fn test_latency_is_exposed_as_duration() {
        let conditions = NetworkConditions::new(false, 400, 0, 0);
        assert_eq!(conditions.latency(), Duration::from_millis(400));
    }

    #[test]
    fn test_display() {
        assert_eq!(NetworkConditions::default().to_string(), "online");
        assert_eq!(NetworkConditions::new(true, 0, 0, 0).to_string(), "offline");

        let throttled = NetworkConditions::throttled(51_200).expect("valid throughput");
        assert!(throttled.to_string().contains("51200"));
    }
}
