// ── Runtime coordinator configuration ──
//
// These types describe *how* to poll the cloud. They carry credential
// data and polling cadence, but never touch disk -- the host (or the
// emberlink-config crate) constructs them and hands them in.

use std::time::Duration;

use secrecy::SecretString;

/// Default polling cadence. Generous, to be nice to the vendor's servers.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1800;

/// Lower bound enforced on the poll interval at configuration time.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

/// How many channel indices to probe per device before giving up.
///
/// Empirical bound observed against the upstream service: no unit has
/// ever exposed more than 9 channels. Overridable via
/// [`CoordinatorConfig::channel_probe_limit`].
pub const DEFAULT_CHANNEL_PROBE_LIMIT: u32 = 9;

/// Account credentials captured once at setup.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub email: String,
    pub password: SecretString,
}

/// Configuration for a single [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How often the background task runs a refresh cycle.
    /// Clamped to [`MIN_POLL_INTERVAL_SECS`] by the constructors.
    pub poll_interval: Duration,
    /// Channel discovery probe ceiling per device.
    pub channel_probe_limit: u32,
}

impl CoordinatorConfig {
    /// Build a config with the given poll interval, clamped to the
    /// minimum bound.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(Duration::from_secs(MIN_POLL_INTERVAL_SECS)),
            channel_probe_limit: DEFAULT_CHANNEL_PROBE_LIMIT,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS))
    }
}
