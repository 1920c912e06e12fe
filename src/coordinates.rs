//! Conversions between cylindrical polar and cartesian representations.
//!
//! Positions are `(r, phi, z)` or `(x, y, z)`; fields are `(Br, Bphi, Bz)` or `(Bx, By, Bz)`.
//! The cylindrical axis is the cartesian z axis, so the z components are shared.

use crate::constant::PI;
use nalgebra::Vector3;

/// Converts an angle in radians to degrees.
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Converts an angle in degrees to radians.
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Converts a cylindrical polar position `(r, phi, z)` to cartesian `(x, y, z)`.
pub fn polar_to_cartesian_coords(polar: &Vector3<f64>) -> Vector3<f64> {
    let (r, phi, z) = (polar.x, polar.y, polar.z);
    Vector3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Converts a cartesian position `(x, y, z)` to cylindrical polar `(r, phi, z)`.
///
/// `phi` lies in `(-pi, pi]`, and is zero on the axis.
pub fn cartesian_to_polar_coords(cartesian: &Vector3<f64>) -> Vector3<f64> {
    let (x, y, z) = (cartesian.x, cartesian.y, cartesian.z);
    Vector3::new((x * x + y * y).sqrt(), y.atan2(x), z)
}

/// Rotates polar field components `(Br, Bphi, Bz)` at azimuth `phi` into cartesian `(Bx, By, Bz)`.
pub fn polar_to_cartesian_field(field: &Vector3<f64>, phi: f64) -> Vector3<f64> {
    let (sin, cos) = phi.sin_cos();
    Vector3::new(
        field.x * cos - field.y * sin,
        field.x * sin + field.y * cos,
        field.z,
    )
}

/// Rotates cartesian field components `(Bx, By, Bz)` at azimuth `phi` into polar `(Br, Bphi, Bz)`.
pub fn cartesian_to_polar_field(field: &Vector3<f64>, phi: f64) -> Vector3<f64> {
    let (sin, cos) = phi.sin_cos();
    Vector3::new(
        field.x * cos + field.y * sin,
        -field.x * sin + field.y * cos,
        field.z,
    )
}
