//! Update coordinator and domain model between `emberlink-api` and a host
//! presentation layer.
//!
//! This crate owns the polling engine and everything it feeds:
//!
//! - **[`Coordinator`]** — Single-flight polling engine. Lazily signs in on
//!   the first cycle, walks the user → devices → channels dependent fetch
//!   (channels discovered by probing indices until a not-found), tolerates
//!   per-record failures, and commits an immutable snapshot per successful
//!   cycle. [`spawn()`](Coordinator::spawn) runs it on the configured
//!   interval while subscribers exist.
//!
//! - **[`TelemetryData`]** — The snapshot: devices plus channels keyed by
//!   resolved device identifier, with synchronous `find_device` /
//!   `find_channel` lookups.
//!
//! - **Domain model** ([`model`]) — Validated [`Device`] / [`Channel`]
//!   records; raw cloud records missing required fields are rejected with
//!   the exact missing-field list.
//!
//! - **Sensor classification** ([`sensor`]) — Capability tests deciding
//!   which per-metric sensors the host materializes, recomputed over each
//!   snapshot.
//!
//! - **[`TelemetryApi`]** — The cloud read contract the coordinator
//!   depends on; implemented by `emberlink_api::CloudClient` and by
//!   in-memory fakes in tests.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod sensor;
pub mod snapshot;
pub mod verify;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::TelemetryApi;
pub use config::{
    AccountCredentials, CoordinatorConfig, DEFAULT_CHANNEL_PROBE_LIMIT,
    DEFAULT_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS,
};
pub use coordinator::{Coordinator, RefreshEvent};
pub use error::CoreError;
pub use model::{Channel, Device, MissingFields, Unit};
pub use sensor::{DeviceInfo, SensorKind, SensorSpec, plan_sensors, sensor_value};
pub use snapshot::TelemetryData;
pub use verify::{CredentialError, VerifiedAccount, verify_credentials};
