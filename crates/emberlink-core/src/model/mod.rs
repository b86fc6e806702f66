// ── Domain model ──
//
// Validated telemetry types built from raw cloud records. A raw record
// becomes a domain value only if every required field is present and
// non-null; rejection carries the exact missing-field list so the
// coordinator can log something diagnosable.

mod channel;
mod device;

pub use channel::{Channel, Unit};
pub use device::Device;

use thiserror::Error;

/// A raw record was missing one or more required fields.
///
/// The field names are the wire names, enumerated in declaration order,
/// so the log line matches what the cloud actually (didn't) send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{record} record missing required field(s): {}", .fields.join(", "))]
pub struct MissingFields {
    record: &'static str,
    fields: Vec<&'static str>,
}

impl MissingFields {
    pub(crate) fn new(record: &'static str, fields: Vec<&'static str>) -> Self {
        Self { record, fields }
    }

    /// The record kind ("device" or "channel").
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// The wire names of the missing fields.
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}
