//! Object-model entries whose shape depends on a string tag.
//!
//! The control server describes kinematics by `name` and filament monitors by
//! `type`. Known tags decode into typed variants; anything else is kept as an
//! `Unrecognized` variant carrying the raw fields so nothing is lost when the
//! firmware grows new variants.

mod filament_monitor;
mod kinematics;

use serde_json::{Map, Value};

pub use self::filament_monitor::{
    FilamentMonitor, FilamentMonitorStatus, LaserCalibration, LaserConfiguration,
    LaserFilamentMonitor, PulsedCalibration, PulsedConfiguration, PulsedFilamentMonitor,
    RotatingMagnetCalibration, RotatingMagnetConfiguration, RotatingMagnetFilamentMonitor,
    SimpleFilamentMonitor,
};
pub use self::kinematics::{
    CoreKinematics, DeltaKinematics, DeltaTower, HangprinterKinematics, Kinematics,
    KinematicsName, ScaraKinematics,
};

fn tag<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or_default()
}
