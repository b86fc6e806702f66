// ── Channel domain type ──

use std::fmt;

use serde::Serialize;

use emberlink_api::RawChannel;

use super::MissingFields;

/// Channel status value the cloud reports for a healthy probe.
const STATUS_NORMAL: &str = "NORMAL";

/// Measurement unit for a channel reading.
///
/// Closed set as far as sensor classification is concerned; anything the
/// cloud invents later lands in `Other` and is skipped (with a warning)
/// rather than misrendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Unit {
    Fahrenheit,
    Celsius,
    HumidityPercent,
    Other(String),
}

impl Unit {
    /// Map a wire unit code to a `Unit`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "F" => Self::Fahrenheit,
            "C" => Self::Celsius,
            "H" => Self::HumidityPercent,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns `true` for units a temperature sensor can render.
    pub fn is_temperature(&self) -> bool {
        matches!(self, Self::Fahrenheit | Self::Celsius)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fahrenheit => write!(f, "°F"),
            Self::Celsius => write!(f, "°C"),
            Self::HumidityPercent => write!(f, "%"),
            Self::Other(code) => write!(f, "{code}"),
        }
    }
}

/// One probe channel attached to a device.
///
/// Belongs to exactly one [`Device`](super::Device), keyed by the device's
/// resolved identifier in the snapshot's channel map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    /// Channel index as the cloud reports it (a string, counted from "1").
    pub number: String,
    /// Current reading in `units`.
    pub value: f64,
    pub units: Unit,
    /// Raw status code; anything other than "NORMAL" is a probe fault.
    pub status: Option<String>,
    /// User-assigned name.
    pub label: Option<String>,
}

impl Channel {
    /// Validate a raw cloud record into a `Channel`.
    ///
    /// Same contract as [`Device::from_raw`](super::Device::from_raw):
    /// a missing required field rejects this record only, never its
    /// siblings.
    pub fn from_raw(raw: RawChannel) -> Result<Self, MissingFields> {
        let mut missing = Vec::new();
        if raw.number.is_none() {
            missing.push("number");
        }
        if raw.value.is_none() {
            missing.push("value");
        }
        if raw.units.is_none() {
            missing.push("units");
        }
        if !missing.is_empty() {
            return Err(MissingFields::new("channel", missing));
        }

        Ok(Self {
            number: raw.number.unwrap_or_default(),
            value: raw.value.unwrap_or_default(),
            units: Unit::from_code(&raw.units.unwrap_or_default()),
            status: raw.status,
            label: raw.label,
        })
    }

    /// Returns `true` if the cloud reported a non-NORMAL status.
    pub fn has_fault(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s != STATUS_NORMAL)
    }

    /// Human-readable name for log lines and entity naming.
    pub fn display_name(&self) -> String {
        format!(
            "{} (Ch. {})",
            self.label.as_deref().unwrap_or("unnamed channel"),
            self.number,
        )
    }
}
