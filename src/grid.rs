//! Define sampling grids in cylindrical polar coordinates.
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolenoidError};
use crate::point::{FieldPoint, PointRepresentation};

/// Placement of the samples along each axis of a [GridSpec].
///
/// Whatever the policy, an axis with resolution `n` yields exactly `n` samples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Samples span the closed interval `[min, max]`, both ends included:
    /// `v_i = min + i (max - min) / (n - 1)`. A single sample sits at `min`.
    #[default]
    Closed,
    /// Samples span `[min, max)`: `v_i = min + i (max - min) / n`.
    /// Useful for a full turn in azimuth, where `max` would duplicate `min`.
    HalfOpen,
}

impl Boundary {
    /// Position of sample `index` out of `n` along `[min, max]`.
    fn sample(self, min: f64, max: f64, n: usize, index: usize) -> f64 {
        match self {
            Boundary::Closed if n == 1 => min,
            Boundary::Closed if index + 1 == n => max,
            Boundary::Closed => min + index as f64 * (max - min) / (n - 1) as f64,
            Boundary::HalfOpen => min + index as f64 * (max - min) / n as f64,
        }
    }
}

/// A box in `(r, phi, z)` sampled with resolution `(nr, nphi, nz)`.
///
/// Points are enumerated in priority r, phi, z; samples with adjacent z are adjacent in
/// the enumeration, and the index of a sample is
/// `(ir * nphi + iphi) * nz + iz`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Radial extent, in m.
    pub r_min: f64,
    pub r_max: f64,
    /// Azimuthal extent, in rad.
    pub phi_min: f64,
    pub phi_max: f64,
    /// Axial extent, in m.
    pub z_min: f64,
    pub z_max: f64,
    pub nr: usize,
    pub nphi: usize,
    pub nz: usize,
    #[serde(default)]
    pub boundary: Boundary,
    /// Coordinate system the generated points are stored in.
    #[serde(default)]
    pub representation: PointRepresentation,
}

impl GridSpec {
    /// Creates a validated grid with closed boundaries and polar points.
    ///
    /// # Arguments
    ///
    /// `r`, `phi`, `z`: `[min, max]` extent along each axis
    ///
    /// `resolution`: number of samples `[nr, nphi, nz]`
    pub fn new(r: [f64; 2], phi: [f64; 2], z: [f64; 2], resolution: [usize; 3]) -> Result<Self> {
        let grid = GridSpec {
            r_min: r[0],
            r_max: r[1],
            phi_min: phi[0],
            phi_max: phi[1],
            z_min: z[0],
            z_max: z[1],
            nr: resolution[0],
            nphi: resolution[1],
            nz: resolution[2],
            boundary: Boundary::default(),
            representation: PointRepresentation::default(),
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_representation(mut self, representation: PointRepresentation) -> Self {
        self.representation = representation;
        self
    }

    /// Checks the extents and resolutions describe a non-empty, well ordered box.
    pub fn validate(&self) -> Result<()> {
        let axes = [
            ("r", self.r_min, self.r_max, self.nr),
            ("phi", self.phi_min, self.phi_max, self.nphi),
            ("z", self.z_min, self.z_max, self.nz),
        ];
        for &(name, min, max, n) in axes.iter() {
            if !min.is_finite() || !max.is_finite() {
                return Err(SolenoidError::InvalidGrid(format!(
                    "{} range [{}, {}] must be finite",
                    name, min, max
                )));
            }
            if min > max {
                return Err(SolenoidError::InvalidGrid(format!(
                    "{} range [{}, {}] is inverted",
                    name, min, max
                )));
            }
            if n == 0 {
                return Err(SolenoidError::InvalidGrid(format!(
                    "{} resolution must be at least 1",
                    name
                )));
            }
        }
        if self.r_min < 0.0 {
            return Err(SolenoidError::InvalidGrid(format!(
                "r_min must not be negative, got {}",
                self.r_min
            )));
        }
        self.nr
            .checked_mul(self.nphi)
            .and_then(|n| n.checked_mul(self.nz))
            .ok_or_else(|| SolenoidError::InvalidGrid("too many grid points".to_string()))?;
        Ok(())
    }

    /// Number of points in the grid, `nr * nphi * nz`.
    pub fn len(&self) -> usize {
        self.nr * self.nphi * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Polar position `(r, phi, z)` of the sample with the given index.
    pub fn position(&self, index: usize) -> Vector3<f64> {
        let iz = index % self.nz;
        let iphi = (index / self.nz) % self.nphi;
        let ir = index / (self.nz * self.nphi);
        Vector3::new(
            self.boundary.sample(self.r_min, self.r_max, self.nr, ir),
            self.boundary.sample(self.phi_min, self.phi_max, self.nphi, iphi),
            self.boundary.sample(self.z_min, self.z_max, self.nz, iz),
        )
    }

    /// Lazily enumerates every grid point together with its index.
    ///
    /// Points carry a zero field.
    pub fn points(&self) -> impl Iterator<Item = (usize, FieldPoint)> + Send + '_ {
        (0..self.len()).map(move |index| {
            (
                index,
                FieldPoint::from_polar_position(self.representation, self.position(index)),
            )
        })
    }
}
