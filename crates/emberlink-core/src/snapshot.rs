// ── Telemetry snapshot ──
//
// The atomic unit of coordinator state: everything one successful refresh
// produced. Replaced wholesale on commit, never mutated in place, so a
// reader holding an Arc always sees a consistent device/channel pairing.

use std::collections::HashMap;

use crate::model::{Channel, Device};

/// All data retrieved by one successful refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct TelemetryData {
    /// Devices in the account's display order.
    pub devices: Vec<Device>,
    /// Channels per device, keyed by the device's resolved identifier.
    pub channels: HashMap<String, Vec<Channel>>,
}

impl TelemetryData {
    /// Look up a device by its resolved identifier.
    ///
    /// O(n) over the device list -- accounts hold tens of devices at most.
    pub fn find_device(&self, identifier: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.identifier() == identifier)
    }

    /// Look up a channel by owning device identifier and channel number.
    pub fn find_channel(&self, device_identifier: &str, number: &str) -> Option<&Channel> {
        self.channels
            .get(device_identifier)?
            .iter()
            .find(|c| c.number == number)
    }

    /// Channels of a device, in discovery (ascending index) order.
    pub fn device_channels(&self, device_identifier: &str) -> &[Channel] {
        self.channels
            .get(device_identifier)
            .map_or(&[], Vec::as_slice)
    }
}
