// ── Sensor classification ──
//
// Decides which per-metric sensors a host platform should materialize
// for the current snapshot. Eligibility is a capability test over the
// plain Device/Channel records -- a device gets a battery sensor iff it
// reported a battery level, never because of its type. Recomputed from
// scratch on every call; nothing here is cached.

use tracing::{debug, warn};

use crate::model::{Channel, Device, Unit};
use crate::snapshot::TelemetryData;

/// Manufacturer string for host device registries.
pub const MANUFACTURER: &str = "Emberlink";

/// Temperature scale a channel sensor renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Fahrenheit,
    Celsius,
}

/// What kind of sensor a spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Battery level, percent.
    Battery,
    /// WiFi signal strength, dB.
    Signal,
    /// Probe temperature in the channel's reported scale.
    Temperature(TemperatureUnit),
    /// Relative humidity, percent.
    Humidity,
}

/// Grouping metadata so the host renders all of a device's sensors under
/// one device entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
    pub serial: String,
    pub manufacturer: &'static str,
}

impl DeviceInfo {
    fn for_device(device: &Device) -> Self {
        Self {
            identifier: device.identifier().to_owned(),
            name: device.label.clone(),
            model: device.model.clone(),
            firmware: device.firmware.clone(),
            serial: device.serial.clone(),
            manufacturer: MANUFACTURER,
        }
    }
}

/// One sensor the host should materialize.
///
/// `unique_id` is stable across refreshes (identifier + metric), so the
/// host can reconcile entities between setup passes.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSpec {
    pub kind: SensorKind,
    pub unique_id: String,
    pub name: String,
    pub device_identifier: String,
    /// Set for channel-backed sensors, `None` for device metrics.
    pub channel_number: Option<String>,
    /// Decimal places the host should display.
    pub suggested_precision: u8,
    pub device_info: DeviceInfo,
}

/// Classify the whole snapshot into sensor specs.
///
/// Devices and channels that lack the relevant capability simply produce
/// no spec; a channel with an unrecognized unit code is skipped with a
/// warning, not an error.
pub fn plan_sensors(data: &TelemetryData) -> Vec<SensorSpec> {
    let mut specs = Vec::new();

    for device in &data.devices {
        let identifier = device.identifier();
        let info = DeviceInfo::for_device(device);

        if device.battery.is_some() {
            specs.push(SensorSpec {
                kind: SensorKind::Battery,
                unique_id: format!("{identifier}-battery"),
                name: "Battery".to_owned(),
                device_identifier: identifier.to_owned(),
                channel_number: None,
                suggested_precision: 0,
                device_info: info.clone(),
            });
        } else {
            debug!(
                device = %device.display_name(),
                "no battery level reported; skipping battery sensor"
            );
        }

        if device.wifi_strength.is_some() {
            specs.push(SensorSpec {
                kind: SensorKind::Signal,
                unique_id: format!("{identifier}-signal"),
                name: "Signal".to_owned(),
                device_identifier: identifier.to_owned(),
                channel_number: None,
                suggested_precision: 0,
                device_info: info.clone(),
            });
        } else {
            debug!(
                device = %device.display_name(),
                "no wifi strength reported; skipping signal sensor"
            );
        }

        for channel in data.device_channels(identifier) {
            if let Some(spec) = channel_spec(device, channel, &info) {
                specs.push(spec);
            }
        }
    }

    specs
}

fn channel_spec(device: &Device, channel: &Channel, info: &DeviceInfo) -> Option<SensorSpec> {
    let kind = match &channel.units {
        Unit::Fahrenheit => SensorKind::Temperature(TemperatureUnit::Fahrenheit),
        Unit::Celsius => SensorKind::Temperature(TemperatureUnit::Celsius),
        Unit::HumidityPercent => SensorKind::Humidity,
        Unit::Other(code) => {
            warn!(
                device = %device.display_name(),
                channel = %channel.display_name(),
                code,
                "unrecognized unit code; no sensor created"
            );
            return None;
        }
    };

    let identifier = device.identifier();
    let precision = match kind {
        SensorKind::Temperature(_) => 1,
        SensorKind::Battery | SensorKind::Signal | SensorKind::Humidity => 0,
    };

    Some(SensorSpec {
        kind,
        unique_id: format!("{identifier}-ch{}", channel.number),
        name: channel.display_name(),
        device_identifier: identifier.to_owned(),
        channel_number: Some(channel.number.clone()),
        suggested_precision: precision,
        device_info: info.clone(),
    })
}

/// Resolve a spec's current reading against a snapshot.
///
/// `None` means the backing record (or the capability field the spec was
/// classified from) is gone, and the sensor must render unavailable --
/// stale values are never frozen in place.
pub fn sensor_value(data: &TelemetryData, spec: &SensorSpec) -> Option<f64> {
    match spec.kind {
        SensorKind::Battery => data.find_device(&spec.device_identifier)?.battery,
        SensorKind::Signal => data.find_device(&spec.device_identifier)?.wifi_strength,
        SensorKind::Temperature(_) => {
            let channel = find_spec_channel(data, spec)?;
            channel.units.is_temperature().then_some(channel.value)
        }
        SensorKind::Humidity => {
            let channel = find_spec_channel(data, spec)?;
            (channel.units == Unit::HumidityPercent).then_some(channel.value)
        }
    }
}

fn find_spec_channel<'a>(data: &'a TelemetryData, spec: &SensorSpec) -> Option<&'a Channel> {
    let number = spec.channel_number.as_deref()?;
    data.find_channel(&spec.device_identifier, number)
}
