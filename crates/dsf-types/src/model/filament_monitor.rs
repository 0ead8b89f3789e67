//! Filament monitors, tagged by `type`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const TYPE_KEY: &str = "type";

/// Last status reported by a filament monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilamentMonitorStatus {
    /// No monitor is present.
    #[default]
    NoMonitor,
    /// Filament is working normally.
    Ok,
    /// No data received from the remote monitor.
    NoDataReceived,
    /// No filament present.
    NoFilament,
    /// Sensor reports less movement than expected.
    TooLittleMovement,
    /// Sensor reports more movement than expected.
    TooMuchMovement,
    /// Sensor encountered an error.
    SensorError,
}

/// A configured filament monitor.
#[derive(Debug, Clone, PartialEq)]
pub enum FilamentMonitor {
    /// Switch-based presence sensor.
    Simple(SimpleFilamentMonitor),
    /// Laser movement sensor.
    Laser(LaserFilamentMonitor),
    /// Pulse-generating movement sensor.
    Pulsed(PulsedFilamentMonitor),
    /// Rotating magnet movement sensor.
    RotatingMagnet(RotatingMagnetFilamentMonitor),
    /// A type this crate does not know, with every field as sent.
    Unrecognized {
        /// Raw `type` value.
        monitor_type: String,
        /// All fields of the object, including `type`.
        fields: Map<String, Value>,
    },
}

impl FilamentMonitor {
    /// Returns whether the monitor is enabled, when known.
    #[must_use]
    pub fn enabled(&self) -> Option<bool> {
        match self {
            Self::Simple(monitor) => Some(monitor.enabled),
            Self::Laser(monitor) => Some(monitor.enabled),
            Self::Pulsed(monitor) => Some(monitor.enabled),
            Self::RotatingMagnet(monitor) => Some(monitor.enabled),
            Self::Unrecognized { fields, .. } => fields.get("enabled").and_then(Value::as_bool),
        }
    }

    fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let monitor_type = super::tag(&fields, TYPE_KEY).to_owned();
        match monitor_type.as_str() {
            "simple" => Ok(Self::Simple(serde_json::from_value(Value::Object(fields))?)),
            "laser" => Ok(Self::Laser(serde_json::from_value(Value::Object(fields))?)),
            "pulsed" => Ok(Self::Pulsed(serde_json::from_value(Value::Object(fields))?)),
            "rotatingMagnet" => Ok(Self::RotatingMagnet(serde_json::from_value(
                Value::Object(fields),
            )?)),
            _ => Ok(Self::Unrecognized {
                monitor_type,
                fields,
            }),
        }
    }

    fn type_name(&self) -> &str {
        match self {
            Self::Simple(_) => "simple",
            Self::Laser(_) => "laser",
            Self::Pulsed(_) => "pulsed",
            Self::RotatingMagnet(_) => "rotatingMagnet",
            Self::Unrecognized { monitor_type, .. } => monitor_type,
        }
    }
}

impl<'de> Deserialize<'de> for FilamentMonitor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(D::Error::custom)
    }
}

impl Serialize for FilamentMonitor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            Self::Simple(monitor) => serde_json::to_value(monitor),
            Self::Laser(monitor) => serde_json::to_value(monitor),
            Self::Pulsed(monitor) => serde_json::to_value(monitor),
            Self::RotatingMagnet(monitor) => serde_json::to_value(monitor),
            Self::Unrecognized { fields, .. } => return fields.serialize(serializer),
        };
        let mut fields = match body.map_err(serde::ser::Error::custom)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        fields.insert(TYPE_KEY.to_owned(), Value::from(self.type_name()));
        fields.serialize(serializer)
    }
}

/// Switch-based filament presence sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimpleFilamentMonitor {
    /// Whether the monitor is enabled.
    pub enabled: bool,
    /// Last reported status.
    pub status: FilamentMonitorStatus,
    /// Whether filament is present, when the sensor can tell.
    pub filament_present: Option<bool>,
}

/// Laser filament movement sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaserFilamentMonitor {
    /// Whether the monitor is enabled.
    pub enabled: bool,
    /// Last reported status.
    pub status: FilamentMonitorStatus,
    /// Calibrated properties, once enough filament has moved.
    pub calibrated: Option<LaserCalibration>,
    /// Configured properties.
    pub configured: LaserConfiguration,
}

/// Calibrated laser monitor properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaserCalibration {
    /// Lowest measured movement percentage.
    pub percent_min: f64,
    /// Highest measured movement percentage.
    pub percent_max: f64,
    /// Calibrated sensitivity.
    pub sensitivity: f64,
    /// Extruded distance in mm.
    pub total_distance: f64,
}

/// Configured laser monitor properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaserConfiguration {
    /// Minimum allowed movement percentage.
    pub percent_min: f64,
    /// Maximum allowed movement percentage.
    pub percent_max: f64,
    /// Sample distance in mm.
    pub sample_distance: f64,
}

/// Pulse-generating filament movement sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulsedFilamentMonitor {
    /// Whether the monitor is enabled.
    pub enabled: bool,
    /// Last reported status.
    pub status: FilamentMonitorStatus,
    /// Calibrated properties, once enough filament has moved.
    pub calibrated: Option<PulsedCalibration>,
    /// Configured properties.
    pub configured: PulsedConfiguration,
}

/// Calibrated pulsed monitor properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulsedCalibration {
    /// Extrusion distance per pulse in mm.
    pub mm_per_pulse: f64,
    /// Lowest measured movement percentage.
    pub percent_min: f64,
    /// Highest measured movement percentage.
    pub percent_max: f64,
    /// Extruded distance in mm.
    pub total_distance: f64,
}

/// Configured pulsed monitor properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulsedConfiguration {
    /// Extrusion distance per pulse in mm.
    pub mm_per_pulse: f64,
    /// Minimum allowed movement percentage.
    pub percent_min: f64,
    /// Maximum allowed movement percentage.
    pub percent_max: f64,
    /// Sample distance in mm.
    pub sample_distance: f64,
}

/// Rotating magnet filament movement sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotatingMagnetFilamentMonitor {
    /// Whether the monitor is enabled.
    pub enabled: bool,
    /// Last reported status.
    pub status: FilamentMonitorStatus,
    /// Calibrated properties, once enough filament has moved.
    pub calibrated: Option<RotatingMagnetCalibration>,
    /// Configured properties.
    pub configured: RotatingMagnetConfiguration,
}

/// Calibrated rotating magnet monitor properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotatingMagnetCalibration {
    /// Extrusion distance per revolution in mm.
    pub mm_per_rev: f64,
    /// Lowest measured movement percentage.
    pub percent_min: f64,
    /// Highest measured movement percentage.
    pub percent_max: f64,
    /// Extruded distance in mm.
    pub total_distance: f64,
}

/// Configured rotating magnet monitor properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotatingMagnetConfiguration {
    /// Extrusion distance per revolution in mm.
    pub mm_per_rev: f64,
    /// Minimum allowed movement percentage.
    pub percent_min: f64,
    /// Maximum allowed movement percentage.
    pub percent_max: f64,
    /// Sample distance in mm.
    pub sample_distance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_monitor_types() {
        let monitors: Vec<FilamentMonitor> = serde_json::from_value(json!([
            { "type": "simple", "enabled": true, "status": "ok", "filamentPresent": true },
            { "type": "laser", "enabled": false, "status": "noDataReceived",
              "configured": { "sampleDistance": 3.0 } },
            { "type": "rotatingMagnet", "enabled": true, "status": "tooLittleMovement",
              "calibrated": { "mmPerRev": 28.8 } },
        ]))
        .expect("monitors");
        assert!(matches!(
            &monitors[0],
            FilamentMonitor::Simple(m) if m.filament_present == Some(true)
        ));
        assert!(matches!(
            &monitors[1],
            FilamentMonitor::Laser(m) if m.configured.sample_distance == 3.0
        ));
        assert!(matches!(
            &monitors[2],
            FilamentMonitor::RotatingMagnet(m) if m.calibrated.is_some()
        ));
        assert_eq!(monitors[1].enabled(), Some(false));
    }

    #[test]
    fn unknown_types_keep_raw_fields() {
        let raw = json!({ "type": "capacitive", "enabled": true, "gain": 4 });
        let monitor: FilamentMonitor = serde_json::from_value(raw.clone()).expect("monitor");
        assert!(matches!(
            &monitor,
            FilamentMonitor::Unrecognized { monitor_type, .. } if monitor_type == "capacitive"
        ));
        assert_eq!(monitor.enabled(), Some(true));
        assert_eq!(serde_json::to_value(&monitor).expect("serialise"), raw);
    }

    #[test]
    fn serialisation_restores_the_type_tag() {
        let monitor = FilamentMonitor::Pulsed(PulsedFilamentMonitor::default());
        let json = serde_json::to_value(&monitor).expect("serialise");
        assert_eq!(json["type"], "pulsed");
        assert_eq!(json["status"], "noMonitor");
    }
}
