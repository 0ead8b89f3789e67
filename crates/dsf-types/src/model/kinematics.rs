//! Machine kinematics, tagged by `name`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

const NAME_KEY: &str = "name";

/// Kinematics names known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum KinematicsName {
    /// Cartesian.
    #[serde(rename = "cartesian")]
    #[strum(serialize = "cartesian")]
    Cartesian,
    /// CoreXY.
    #[serde(rename = "coreXY")]
    #[strum(serialize = "coreXY")]
    CoreXy,
    /// CoreXY with an extra U axis.
    #[serde(rename = "coreXYU")]
    #[strum(serialize = "coreXYU")]
    CoreXyu,
    /// CoreXY with extra U and V axes.
    #[serde(rename = "coreXYUV")]
    #[strum(serialize = "coreXYUV")]
    CoreXyuv,
    /// CoreXZ.
    #[serde(rename = "coreXZ")]
    #[strum(serialize = "coreXZ")]
    CoreXz,
    /// MarkForged.
    #[serde(rename = "markForged")]
    #[strum(serialize = "markForged")]
    MarkForged,
    /// Linear delta.
    #[serde(rename = "delta")]
    #[strum(serialize = "delta")]
    Delta,
    /// Rotary delta.
    #[serde(rename = "Rotary delta")]
    #[strum(serialize = "Rotary delta")]
    RotaryDelta,
    /// Hangprinter.
    Hangprinter,
    /// Five-bar parallel SCARA.
    FiveBarScara,
    /// Serial SCARA.
    Scara,
    /// Polar.
    Polar,
}

/// Configured kinematics.
#[derive(Debug, Clone, PartialEq)]
pub enum Kinematics {
    /// Cartesian, CoreXY family, CoreXZ and MarkForged machines.
    Core(CoreKinematics),
    /// Linear and rotary deltas.
    Delta(DeltaKinematics),
    /// Hangprinter.
    Hangprinter(HangprinterKinematics),
    /// SCARA, five-bar SCARA and polar machines.
    Scara(ScaraKinematics),
    /// A name this crate does not know, with every field as sent.
    Unrecognized {
        /// Raw `name` value.
        name: String,
        /// All fields of the object, including `name`.
        fields: Map<String, Value>,
    },
}

impl Kinematics {
    /// Returns the wire name of the kinematics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Core(kinematics) => kinematics.name.to_string(),
            Self::Delta(kinematics) => kinematics.name.to_string(),
            Self::Hangprinter(kinematics) => kinematics.name.to_string(),
            Self::Scara(kinematics) => kinematics.name.to_string(),
            Self::Unrecognized { name, .. } => name.clone(),
        }
    }

    fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let raw_name = super::tag(&fields, NAME_KEY);
        let Ok(name) = raw_name.parse::<KinematicsName>() else {
            return Ok(Self::Unrecognized {
                name: raw_name.to_owned(),
                fields,
            });
        };
        let object = Value::Object(fields);
        Ok(match name {
            KinematicsName::Cartesian
            | KinematicsName::CoreXy
            | KinematicsName::CoreXyu
            | KinematicsName::CoreXyuv
            | KinematicsName::CoreXz
            | KinematicsName::MarkForged => Self::Core(serde_json::from_value(object)?),
            KinematicsName::Delta | KinematicsName::RotaryDelta => {
                Self::Delta(serde_json::from_value(object)?)
            }
            KinematicsName::Hangprinter => Self::Hangprinter(serde_json::from_value(object)?),
            KinematicsName::FiveBarScara | KinematicsName::Scara | KinematicsName::Polar => {
                Self::Scara(serde_json::from_value(object)?)
            }
        })
    }
}

impl<'de> Deserialize<'de> for Kinematics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(D::Error::custom)
    }
}

impl Serialize for Kinematics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Core(kinematics) => kinematics.serialize(serializer),
            Self::Delta(kinematics) => kinematics.serialize(serializer),
            Self::Hangprinter(kinematics) => kinematics.serialize(serializer),
            Self::Scara(kinematics) => kinematics.serialize(serializer),
            Self::Unrecognized { fields, .. } => fields.serialize(serializer),
        }
    }
}

/// Cartesian-style kinematics with movement matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreKinematics {
    /// Specific kinematics name.
    pub name: KinematicsName,
    /// X coordinates of the Z leadscrews in mm.
    #[serde(default)]
    pub screw_x: Vec<f64>,
    /// Y coordinates of the Z leadscrews in mm.
    #[serde(default)]
    pub screw_y: Vec<f64>,
    /// Regular movement matrix.
    #[serde(default = "identity_matrix")]
    pub forward_matrix: Vec<Vec<f64>>,
    /// Inverse movement matrix.
    #[serde(default = "identity_matrix")]
    pub inverse_matrix: Vec<Vec<f64>>,
}

/// Delta kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaKinematics {
    /// Linear or rotary delta.
    pub name: KinematicsName,
    /// Delta radius in mm.
    #[serde(default)]
    pub delta_radius: f64,
    /// Homed height in mm.
    #[serde(default)]
    pub homed_height: f64,
    /// Printable radius in mm.
    #[serde(default)]
    pub print_radius: f64,
    /// Tower calibration.
    #[serde(default)]
    pub towers: Vec<DeltaTower>,
    /// Bed tilt along X, in percent.
    #[serde(default)]
    pub x_tilt: f64,
    /// Bed tilt along Y, in percent.
    #[serde(default)]
    pub y_tilt: f64,
}

/// Calibration of one delta tower.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeltaTower {
    /// Angle correction in degrees.
    pub angle_correction: f64,
    /// Diagonal rod length in mm.
    pub diagonal: f64,
    /// Endstop adjustment in mm.
    pub endstop_adjustment: f64,
    /// Tower X position in mm.
    pub x_pos: f64,
    /// Tower Y position in mm.
    pub y_pos: f64,
}

/// Hangprinter kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HangprinterKinematics {
    /// Always [`KinematicsName::Hangprinter`].
    pub name: KinematicsName,
    /// Anchor A position.
    #[serde(default = "default_anchor_a")]
    pub anchor_a: Vec<f64>,
    /// Anchor B position.
    #[serde(default = "default_anchor_b")]
    pub anchor_b: Vec<f64>,
    /// Anchor C position.
    #[serde(default = "default_anchor_c")]
    pub anchor_c: Vec<f64>,
    /// Height of the D anchor in mm.
    #[serde(default = "default_anchor_dz")]
    pub anchor_dz: f64,
    /// Printable radius in mm.
    #[serde(default = "default_hangprinter_radius")]
    pub print_radius: f64,
}

/// SCARA and polar kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaraKinematics {
    /// Specific kinematics name.
    pub name: KinematicsName,
    /// X coordinates of the Z leadscrews in mm.
    #[serde(default)]
    pub screw_x: Vec<f64>,
    /// Y coordinates of the Z leadscrews in mm.
    #[serde(default)]
    pub screw_y: Vec<f64>,
}

fn identity_matrix() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ]
}

fn default_anchor_a() -> Vec<f64> {
    vec![0.0, -2000.0, -100.0]
}

fn default_anchor_b() -> Vec<f64> {
    vec![2000.0, 1000.0, -100.0]
}

fn default_anchor_c() -> Vec<f64> {
    vec![-2000.0, 1000.0, -100.0]
}

const fn default_anchor_dz() -> f64 {
    3000.0
}

const fn default_hangprinter_radius() -> f64 {
    1500.0
}
