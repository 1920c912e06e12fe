//! Points in space that carry a magnetic field.
//!
//! A point stores its position and field in one coordinate system, its native
//! representation. Reads in the other system are converted on the fly and never
//! modify the stored values.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::coordinates::{
    cartesian_to_polar_coords, cartesian_to_polar_field, polar_to_cartesian_coords,
    polar_to_cartesian_field,
};
use crate::error::SolenoidError;

/// The coordinate systems a [FieldPoint] can be stored in.
///
/// Names are parsed with [FromStr], both directly and when deserializing, so an unknown
/// name is always a [SolenoidError::InvalidConfiguration].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PointRepresentation {
    /// Cylindrical polar `(r, phi, z)`.
    #[default]
    Polar,
    /// Cartesian `(x, y, z)`.
    Cartesian,
}

impl FromStr for PointRepresentation {
    type Err = SolenoidError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "polar" | "cylindrical" => Ok(PointRepresentation::Polar),
            "cartesian" => Ok(PointRepresentation::Cartesian),
            other => Err(SolenoidError::InvalidConfiguration(format!(
                "unsupported point representation '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for PointRepresentation {
    type Error = SolenoidError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// A point stored in cylindrical polar coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// `(r, phi, z)`, in units of (m, rad, m).
    pub position: Vector3<f64>,
    /// `(Br, Bphi, Bz)`, in units of Tesla.
    pub field: Vector3<f64>,
}

/// A point stored in cartesian coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartesianPoint {
    /// `(x, y, z)`, in units of m.
    pub position: Vector3<f64>,
    /// `(Bx, By, Bz)`, in units of Tesla.
    pub field: Vector3<f64>,
}

impl CartesianPoint {
    /// Azimuth of the point, recomputed from the current position.
    fn phi(&self) -> f64 {
        self.position.y.atan2(self.position.x)
    }
}

/// A position in space together with the magnetic field at that position.
///
/// Points are created with a zero field, which is written once when the field is computed.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "representation", rename_all = "lowercase")]
pub enum FieldPoint {
    Polar(PolarPoint),
    Cartesian(CartesianPoint),
}

impl FieldPoint {
    /// Creates a point at cylindrical polar position `(r, phi, z)`.
    pub fn polar(r: f64, phi: f64, z: f64) -> Self {
        FieldPoint::Polar(PolarPoint {
            position: Vector3::new(r, phi, z),
            field: Vector3::zeros(),
        })
    }

    /// Creates a point at cartesian position `(x, y, z)`.
    pub fn cartesian(x: f64, y: f64, z: f64) -> Self {
        FieldPoint::Cartesian(CartesianPoint {
            position: Vector3::new(x, y, z),
            field: Vector3::zeros(),
        })
    }

    /// Creates a point in the given representation from a cylindrical polar position.
    pub fn from_polar_position(representation: PointRepresentation, polar: Vector3<f64>) -> Self {
        match representation {
            PointRepresentation::Polar => FieldPoint::polar(polar.x, polar.y, polar.z),
            PointRepresentation::Cartesian => {
                let cartesian = polar_to_cartesian_coords(&polar);
                FieldPoint::cartesian(cartesian.x, cartesian.y, cartesian.z)
            }
        }
    }

    pub fn representation(&self) -> PointRepresentation {
        match self {
            FieldPoint::Polar(_) => PointRepresentation::Polar,
            FieldPoint::Cartesian(_) => PointRepresentation::Cartesian,
        }
    }

    /// Position in the native representation of the point.
    pub fn position(&self) -> Vector3<f64> {
        match self {
            FieldPoint::Polar(p) => p.position,
            FieldPoint::Cartesian(p) => p.position,
        }
    }

    /// Field in the native representation of the point.
    pub fn field(&self) -> Vector3<f64> {
        match self {
            FieldPoint::Polar(p) => p.field,
            FieldPoint::Cartesian(p) => p.field,
        }
    }

    /// Stores field components given in the native representation of the point.
    pub fn set_field(&mut self, field: Vector3<f64>) {
        match self {
            FieldPoint::Polar(p) => p.field = field,
            FieldPoint::Cartesian(p) => p.field = field,
        }
    }

    /// Position as `(r, phi, z)`.
    pub fn polar_coordinates(&self) -> Vector3<f64> {
        match self {
            FieldPoint::Polar(p) => p.position,
            FieldPoint::Cartesian(p) => cartesian_to_polar_coords(&p.position),
        }
    }

    /// Position as `(x, y, z)`.
    pub fn cartesian_coordinates(&self) -> Vector3<f64> {
        match self {
            FieldPoint::Polar(p) => polar_to_cartesian_coords(&p.position),
            FieldPoint::Cartesian(p) => p.position,
        }
    }

    /// Field as `(Br, Bphi, Bz)`.
    pub fn polar_field(&self) -> Vector3<f64> {
        match self {
            FieldPoint::Polar(p) => p.field,
            FieldPoint::Cartesian(p) => cartesian_to_polar_field(&p.field, p.phi()),
        }
    }

    /// Field as `(Bx, By, Bz)`.
    pub fn cartesian_field(&self) -> Vector3<f64> {
        match self {
            FieldPoint::Polar(p) => polar_to_cartesian_field(&p.field, p.position.y),
            FieldPoint::Cartesian(p) => p.field,
        }
    }

    /// Sets the field from `(Br, Bphi, Bz)` components.
    pub fn set_field_polar(&mut self, field: Vector3<f64>) {
        match self {
            FieldPoint::Polar(p) => p.field = field,
            FieldPoint::Cartesian(p) => p.field = polar_to_cartesian_field(&field, p.phi()),
        }
    }

    /// Sets the field from `(Bx, By, Bz)` components.
    pub fn set_field_cartesian(&mut self, field: Vector3<f64>) {
        match self {
            FieldPoint::Polar(p) => p.field = cartesian_to_polar_field(&field, p.position.y),
            FieldPoint::Cartesian(p) => p.field = field,
        }
    }

    /// Magnitude of the magnetic field, in Tesla.
    pub fn magnitude(&self) -> f64 {
        self.field().norm()
    }
}

impl fmt::Display for FieldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPoint::Polar(p) => write!(
                f,
                "PolarPoint{{r: {}, phi: {}, z: {}, Br: {}, Bphi: {}, Bz: {}}}",
                p.position.x, p.position.y, p.position.z, p.field.x, p.field.y, p.field.z
            ),
            FieldPoint::Cartesian(p) => write!(
                f,
                "CartesianPoint{{x: {}, y: {}, z: {}, Bx: {}, By: {}, Bz: {}}}",
                p.position.x, p.position.y, p.position.z, p.field.x, p.field.y, p.field.z
            ),
        }
    }
}
