//! Magnetic field from a single circular current loop

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constant::{MU0, PI};
use crate::coordinates::polar_to_cartesian_field;
use crate::maths::{ellip_ke, radial_combination};

/// A filamentary circular current loop.
///
/// The loop is centred on the origin and lies in the `z = 0` plane, so its
/// magnetic axis is the z axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentLoop {
    /// Radius of the loop, in m.
    pub radius: f64,
    /// Current in the loop, in Ampere.
    /// The current is positive if it is right-hand oriented with respect to +z.
    pub current: f64,
}

impl CurrentLoop {
    pub fn new(radius: f64, current: f64) -> Self {
        CurrentLoop { radius, current }
    }

    /// Calculates the field of the loop in cylindrical polar components `(Br, Bphi, Bz)`.
    ///
    /// This is the exact closed-form solution in terms of complete elliptic integrals,
    /// see Simpson et al., "Simple Analytic Expressions for the Magnetic Field of a
    /// Circular Current Loop" (NASA, 2001).
    ///
    /// # Arguments
    ///
    /// `r`: radial distance of the sampler from the magnetic axis, m
    ///
    /// `z`: axial position of the sampler relative to the loop plane, m
    pub fn polar_field(&self, r: f64, z: f64) -> Vector3<f64> {
        let a = self.radius;
        let c = MU0 * self.current / PI;

        let alpha_sq = (a - r).powi(2) + z * z;
        let beta_sq = (a + r).powi(2) + z * z;
        let beta = beta_sq.sqrt();
        // k^2 = 4 a r / beta^2 = 1 - alpha^2 / beta^2; take the form that does not cancel.
        let k_sq = if 4.0 * a * r < 0.5 * beta_sq {
            4.0 * a * r / beta_sq
        } else {
            1.0 - alpha_sq / beta_sq
        };
        let (ellip_k, ellip_e) = ellip_ke(k_sq);

        // On the axis the radial field is 0/0; resolve it geometrically, never from the result.
        // Elsewhere (a^2 + r^2 + z^2) E - alpha^2 K = beta^2 ((1 - k^2/2) E - (1 - k^2) K).
        let br = if r == 0.0 {
            0.0
        } else {
            c * z * beta / (2.0 * alpha_sq * r) * radial_combination(k_sq, ellip_k, ellip_e)
        };
        let bz = c / (2.0 * alpha_sq * beta)
            * ((a * a - r * r - z * z) * ellip_e + alpha_sq * ellip_k);

        Vector3::new(br, 0.0, bz)
    }

    /// Calculates the field of the loop in cartesian components `(Bx, By, Bz)`.
    ///
    /// The radial component is rotated into the x-y plane by the azimuth of the sampler.
    /// On the axis (`x == 0 && y == 0`) the transverse components are exactly zero.
    pub fn cartesian_field(&self, x: f64, y: f64, z: f64) -> Vector3<f64> {
        let r = (x * x + y * y).sqrt();
        let polar = self.polar_field(r, z);
        if x == 0.0 && y == 0.0 {
            return Vector3::new(0.0, 0.0, polar.z);
        }
        polar_to_cartesian_field(&polar, y.atan2(x))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Tests the correct implementation of the loop field off axis.
    #[test]
    fn test_loop_field() {
        let coil = CurrentLoop::new(2.0 * PI, 3e7);
        let field = coil.polar_field(1.0, 1.0);
        assert_approx_eq!(field.x, 0.11190761404575072, 1e-12);
        assert_eq!(field.y, 0.0);
        assert_approx_eq!(field.z, 2.9372828066773601, 1e-12);

        let coil = CurrentLoop::new(0.3, 200.0);
        let field = coil.polar_field(0.1, 0.2);
        assert_approx_eq!(field.x, 5.772298781128670e-5, 1e-16);
        assert_approx_eq!(field.z, 2.324421076174305e-4, 1e-16);
    }

    /// The radial field grows linearly away from the axis, down to the smallest radii.
    #[test]
    fn test_radial_field_near_axis() {
        let coil = CurrentLoop::new(0.3, 200.0);
        let reference = [
            (1e-4, 5.568205629826314e-8),
            (1e-9, 5.568205403309102e-13),
            (1e-11, 5.568205403309101e-15),
        ];
        for &(r, expected) in reference.iter() {
            let field = coil.polar_field(r, 0.2);
            assert_approx_eq!(field.x / expected, 1.0, 1e-12);
            assert_approx_eq!(field.z / 2.4128890081006105e-4, 1.0, 1e-6);
        }
    }

    #[test]
    fn test_field_at_loop_centre() {
        let coil = CurrentLoop::new(1.0, 1.0);
        let field = coil.polar_field(0.0, 0.0);
        assert_eq!(field.x, 0.0);
        assert_approx_eq!(field.z, MU0 / 2.0, 1e-18);
    }

    /// On axis the field reduces to `mu0 I a^2 / (2 (a^2 + z^2)^(3/2))` with no radial part.
    #[test]
    fn test_on_axis_field() {
        for &(a, current) in &[(0.25, 200.0), (1.0, -3.0), (0.01, 1e4)] {
            let coil = CurrentLoop::new(a, current);
            for &z in &[-2.0, -0.3, 0.0, 0.05, 1.7] {
                let field = coil.polar_field(0.0, z);
                assert_eq!(field.x, 0.0);
                assert!(field.z.is_finite() && field.z != 0.0);
                let expected = MU0 * current * a * a / (2.0 * (a * a + z * z).powf(1.5));
                assert_approx_eq!(field.z / expected, 1.0, 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_current_gives_zero_field() {
        let coil = CurrentLoop::new(0.5, 0.0);
        assert_eq!(coil.polar_field(0.2, 0.1), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(coil.polar_field(0.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_radial_field_is_odd_in_z() {
        let coil = CurrentLoop::new(0.4, 12.0);
        let above = coil.polar_field(0.3, 0.2);
        let below = coil.polar_field(0.3, -0.2);
        assert_approx_eq!(above.x, -below.x, 1e-18);
        assert_approx_eq!(above.z, below.z, 1e-18);
    }

    #[test]
    fn test_cartesian_field_matches_polar() {
        let coil = CurrentLoop::new(0.3, 200.0);
        let phi: f64 = 0.7;
        let polar = coil.polar_field(0.1, 0.2);
        let cartesian = coil.cartesian_field(0.1 * phi.cos(), 0.1 * phi.sin(), 0.2);
        assert_approx_eq!(cartesian.x, polar.x * phi.cos(), 1e-16);
        assert_approx_eq!(cartesian.y, polar.x * phi.sin(), 1e-16);
        assert_approx_eq!(cartesian.z, polar.z, 1e-16);
    }

    /// Points on the y axis have `x == 0` but are off the magnetic axis.
    #[test]
    fn test_cartesian_field_on_y_axis() {
        let coil = CurrentLoop::new(0.3, 200.0);
        let polar = coil.polar_field(0.1, 0.2);
        let cartesian = coil.cartesian_field(0.0, 0.1, 0.2);
        assert_approx_eq!(cartesian.x, 0.0, 1e-18);
        assert_approx_eq!(cartesian.y, polar.x, 1e-16);

        let cartesian = coil.cartesian_field(0.0, -0.1, 0.2);
        assert_approx_eq!(cartesian.y, -polar.x, 1e-16);
    }

    #[test]
    fn test_cartesian_field_on_axis() {
        let coil = CurrentLoop::new(0.3, 200.0);
        let field = coil.cartesian_field(0.0, 0.0, 0.15);
        assert_eq!(field.x, 0.0);
        assert_eq!(field.y, 0.0);
        assert_eq!(field.z, coil.polar_field(0.0, 0.15).z);
    }
}
