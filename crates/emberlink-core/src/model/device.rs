// ── Device domain type ──

use serde::Serialize;

use emberlink_api::RawDevice;

use super::MissingFields;

/// One physical unit (gateway, probe hub, node).
///
/// Constructed fresh every refresh from the raw cloud record; immutable
/// once built and superseded wholesale by the next snapshot. Telemetry
/// fields are optional -- presence is what drives sensor eligibility
/// (see [`crate::sensor`]), not a subtype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    /// Hardware serial number. Always present; used for API fetches.
    pub serial: String,
    /// Cloud-assigned device id. Preferred identifier when present.
    pub device_id: Option<String>,
    /// User-assigned name.
    pub label: Option<String>,
    /// Hardware model name.
    pub model: Option<String>,
    pub firmware: Option<String>,
    /// Battery level in percent.
    pub battery: Option<f64>,
    pub battery_charging: Option<bool>,
    /// WiFi signal strength in dB.
    pub wifi_strength: Option<f64>,
}

impl Device {
    /// Validate a raw cloud record into a `Device`.
    ///
    /// Rejects the record with the enumerated missing-field list if any
    /// required field is absent; the caller skips the record for this
    /// refresh cycle and moves on.
    pub fn from_raw(raw: RawDevice) -> Result<Self, MissingFields> {
        let mut missing = Vec::new();
        if raw.serial.is_none() {
            missing.push("serial");
        }
        if !missing.is_empty() {
            return Err(MissingFields::new("device", missing));
        }

        Ok(Self {
            serial: raw.serial.unwrap_or_default(),
            device_id: raw.device_id,
            label: raw.label,
            model: raw.device_name,
            firmware: raw.firmware,
            battery: raw.battery,
            battery_charging: raw.battery_charging,
            wifi_strength: raw.wifi_strength,
        })
    }

    /// The resolved identifier: device id when the cloud assigned one,
    /// serial otherwise. Channels and sensors key off this value.
    pub fn identifier(&self) -> &str {
        self.device_id.as_deref().unwrap_or(&self.serial)
    }

    /// Human-readable name for log lines and entity naming.
    pub fn display_name(&self) -> String {
        format!(
            "{} ({} - {})",
            self.label.as_deref().unwrap_or("unnamed device"),
            self.model.as_deref().unwrap_or("unknown model"),
            self.identifier(),
        )
    }
}
