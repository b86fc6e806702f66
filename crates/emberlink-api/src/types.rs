// Raw wire records for the Emberlink cloud API.
//
// Every telemetry field is optional: the cloud fills in whatever the
// device last reported, and older firmware omits fields newer firmware
// sends. Validation into required-field domain types happens in
// `emberlink-core`, not here.

use std::collections::HashMap;

use serde::Deserialize;

/// The authenticated user's account record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    /// Cloud-side user id (stable across credential changes).
    pub user_id: Option<String>,
    /// The account that owns the registered devices.
    pub account_id: Option<String>,
    /// Display ordering of device serials, keyed by account id.
    #[serde(default)]
    pub device_order: HashMap<String, Vec<String>>,
}

/// One physical unit as the cloud reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDevice {
    pub serial: Option<String>,
    pub device_id: Option<String>,
    /// User-assigned name.
    pub label: Option<String>,
    /// Hardware model name (gateway, meat probe hub, node, ...).
    pub device_name: Option<String>,
    pub firmware: Option<String>,
    /// Battery level in percent.
    pub battery: Option<f64>,
    pub battery_charging: Option<bool>,
    /// WiFi signal strength in dB (negative).
    pub wifi_strength: Option<f64>,
}

/// One probe channel as the cloud reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChannel {
    /// Channel index as a string; the cloud counts from "1".
    pub number: Option<String>,
    pub value: Option<f64>,
    /// Unit code: "F", "C", "H", or something newer firmware invented.
    pub units: Option<String>,
    /// "NORMAL" when healthy; anything else is a probe fault.
    pub status: Option<String>,
    /// User-assigned name.
    pub label: Option<String>,
}
