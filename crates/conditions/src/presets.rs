// crates/conditions/src/presets.rs
//! Named condition presets for common connection profiles
//!
//! Throughput values use kibibit-based rates rounded to whole bytes per
//! second, matching the classic emulation table most tooling ships.

use crate::conditions::NetworkConditions;

/// No connectivity at all
pub fn offline() -> NetworkConditions {
    NetworkConditions::new(true, 0, 0, 0)
}

/// GPRS: 50 kbit/s down, 20 kbit/s up, 500 ms latency
pub fn gprs() -> NetworkConditions {
    NetworkConditions::new(false, 500, 6_400, 2_560)
}

/// Regular 2G: 250 kbit/s down, 50 kbit/s up, 300 ms latency
pub fn regular_2g() -> NetworkConditions {
    NetworkConditions::new(false, 300, 32_000, 6_400)
}

/// Good 2G: 450 kbit/s down, 150 kbit/s up, 150 ms latency
pub fn good_2g() -> NetworkConditions {
    NetworkConditions::new(false, 150, 57_600, 19_200)
}

/// Regular 3G: 750 kbit/s down, 250 kbit/s up, 100 ms latency
pub fn regular_3g() -> NetworkConditions {
    NetworkConditions::new(false, 100, 96_000, 32_000)
}

/// Good 3G: 1.5 Mbit/s down, 750 kbit/s up, 40 ms latency
pub fn good_3g() -> NetworkConditions {
    NetworkConditions::new(false, 40, 196_608, 96_000)
}

/// Regular 4G: 4 Mbit/s down, 3 Mbit/s up, 20 ms latency
pub fn regular_4g() -> NetworkConditions {
    NetworkConditions::new(false, 20, 524_288, 393_216)
}

/// WiFi: 30 Mbit/s down, 15 Mbit/s up, 2 ms latency
pub fn wifi() -> NetworkConditions {
    NetworkConditions::new(false, 2, 3_932_160, 1_966_080)
}
