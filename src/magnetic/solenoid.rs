//! Magnetic field of a multi-layer solenoid.
//!
//! The solenoid is wound from `layers` concentric layers, each of `turns` evenly spaced
//! circular loops. The field at a point is the sum of the closed-form field of every loop.
//!
//! # Accumulation order
//!
//! Floating point addition is not associative, so the summation order is fixed:
//! the loops of each layer are summed in ascending turn order into a per-layer partial
//! sum, and the partial sums are combined in ascending layer order. The sequential and
//! the layer-parallel paths both follow this order, so they agree bit for bit whatever
//! the number of threads.

use std::num::NonZeroUsize;

use nalgebra::Vector3;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolenoidError};
use crate::magnetic::loop_field::CurrentLoop;
use crate::point::FieldPoint;

/// Parameters of a solenoid, before validation.
///
/// All lengths are in m and the current in Ampere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolenoidBuilder {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub length: f64,
    pub current: f64,
    /// Number of turns in each layer.
    pub turns: usize,
    pub layers: usize,
    /// Position of the centre of the solenoid along the z axis.
    #[serde(default)]
    pub centre: f64,
}

impl SolenoidBuilder {
    /// Validates the parameters and creates the [Solenoid].
    pub fn build(self) -> Result<Solenoid> {
        let finite = [
            ("inner radius", self.inner_radius),
            ("outer radius", self.outer_radius),
            ("length", self.length),
            ("current", self.current),
            ("centre", self.centre),
        ];
        for (name, value) in finite.iter() {
            if !value.is_finite() {
                return Err(SolenoidError::InvalidSolenoid(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if self.inner_radius <= 0.0 {
            return Err(SolenoidError::InvalidSolenoid(format!(
                "inner radius must be positive, got {}",
                self.inner_radius
            )));
        }
        if self.outer_radius < self.inner_radius {
            return Err(SolenoidError::InvalidSolenoid(format!(
                "outer radius {} is smaller than inner radius {}",
                self.outer_radius, self.inner_radius
            )));
        }
        if self.length <= 0.0 {
            return Err(SolenoidError::InvalidSolenoid(format!(
                "length must be positive, got {}",
                self.length
            )));
        }
        if self.turns == 0 || self.layers == 0 {
            return Err(SolenoidError::InvalidSolenoid(format!(
                "turns and layers must be positive, got {} turns and {} layers",
                self.turns, self.layers
            )));
        }
        Ok(Solenoid { parameters: self })
    }
}

/// A tightly wound solenoid whose magnetic axis is the z axis.
///
/// A `Solenoid` can only be obtained from a validated [SolenoidBuilder], so its geometry
/// is always well formed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SolenoidBuilder", into = "SolenoidBuilder")]
pub struct Solenoid {
    parameters: SolenoidBuilder,
}

impl TryFrom<SolenoidBuilder> for Solenoid {
    type Error = SolenoidError;

    fn try_from(builder: SolenoidBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<Solenoid> for SolenoidBuilder {
    fn from(solenoid: Solenoid) -> Self {
        solenoid.parameters
    }
}

impl Solenoid {
    /// Creates a solenoid, rejecting invalid geometry.
    ///
    /// # Arguments
    ///
    /// `inner_radius`, `outer_radius`: radial extent of the winding, m
    ///
    /// `length`: axial length of the winding, m
    ///
    /// `current`: current in each turn, Ampere
    ///
    /// `centre`: axial position of the centre of the solenoid, m
    ///
    /// `turns`: turns per layer
    ///
    /// `layers`: number of layers
    pub fn new(
        inner_radius: f64,
        outer_radius: f64,
        length: f64,
        current: f64,
        centre: f64,
        turns: usize,
        layers: usize,
    ) -> Result<Self> {
        SolenoidBuilder {
            inner_radius,
            outer_radius,
            length,
            current,
            turns,
            layers,
            centre,
        }
        .build()
    }

    pub fn inner_radius(&self) -> f64 {
        self.parameters.inner_radius
    }
    pub fn outer_radius(&self) -> f64 {
        self.parameters.outer_radius
    }
    pub fn length(&self) -> f64 {
        self.parameters.length
    }
    pub fn current(&self) -> f64 {
        self.parameters.current
    }
    pub fn turns(&self) -> usize {
        self.parameters.turns
    }
    pub fn layers(&self) -> usize {
        self.parameters.layers
    }
    pub fn centre(&self) -> f64 {
        self.parameters.centre
    }

    /// Axial distance between neighbouring turns of a layer.
    pub fn loop_separation(&self) -> f64 {
        self.length() / self.turns() as f64
    }

    /// Radial distance between neighbouring layers.
    pub fn layer_separation(&self) -> f64 {
        (self.outer_radius() - self.inner_radius()) / self.layers() as f64
    }

    /// Radius of the loops in `layer`, offset half a layer separation from the inner boundary.
    pub fn layer_radius(&self, layer: usize) -> f64 {
        self.inner_radius() + (layer as f64 + 0.5) * self.layer_separation()
    }

    /// Axial position of loop `turn`; turn 0 sits at `centre - length / 2`.
    pub fn loop_position(&self, turn: usize) -> f64 {
        self.centre() - 0.5 * self.length() + turn as f64 * self.loop_separation()
    }

    /// Sums the field of every loop in one layer, in ascending turn order.
    ///
    /// The result is expressed in the native representation of `point`.
    fn layer_field(&self, layer: usize, point: &FieldPoint) -> Vector3<f64> {
        let coil = CurrentLoop::new(self.layer_radius(layer), self.current());
        let mut sum = Vector3::zeros();
        match point {
            FieldPoint::Polar(p) => {
                for turn in 0..self.turns() {
                    let z = p.position.z - self.loop_position(turn);
                    sum += coil.polar_field(p.position.x, z);
                }
            }
            FieldPoint::Cartesian(p) => {
                for turn in 0..self.turns() {
                    let z = p.position.z - self.loop_position(turn);
                    sum += coil.cartesian_field(p.position.x, p.position.y, z);
                }
            }
        }
        sum
    }

    /// Calculates the field of the solenoid at `point`, sequentially.
    ///
    /// The components are in the native representation of `point`: `(Br, Bphi, Bz)` for
    /// polar points and `(Bx, By, Bz)` for cartesian points. The point is not modified.
    pub fn field_at(&self, point: &FieldPoint) -> Vector3<f64> {
        reduce_layers((0..self.layers()).map(|layer| self.layer_field(layer, point)))
    }

    /// Calculates the field of the solenoid at `point`, with layers spread over `pool`.
    ///
    /// Each layer is summed on a single thread; the partial sums are collected in layer
    /// order and reduced sequentially, so the result is identical to [Solenoid::field_at].
    pub fn field_at_parallel(&self, point: &FieldPoint, pool: &ThreadPool) -> Vector3<f64> {
        let partial_sums: Vec<Vector3<f64>> = pool.install(|| {
            (0..self.layers())
                .into_par_iter()
                .map(|layer| self.layer_field(layer, point))
                .collect()
        });
        reduce_layers(partial_sums)
    }

    /// Calculates the field at `point` and stores it in the point.
    pub fn compute_point(&self, point: &mut FieldPoint) {
        let field = self.field_at(point);
        point.set_field(field);
    }
}

/// Combines per-layer partial sums in the order given, which must be ascending layer order.
fn reduce_layers<I>(partial_sums: I) -> Vector3<f64>
where
    I: IntoIterator<Item = Vector3<f64>>,
{
    partial_sums
        .into_iter()
        .fold(Vector3::zeros(), |total, partial| total + partial)
}

/// Builds a thread pool for layer-parallel aggregation.
///
/// `threads` defaults to the available hardware parallelism.
pub fn layer_pool(threads: Option<usize>) -> Result<ThreadPool> {
    let threads = match threads {
        Some(0) => {
            return Err(SolenoidError::InvalidConfiguration(
                "layer pool needs at least one thread".to_string(),
            ))
        }
        Some(n) => n,
        None => std::thread::available_parallelism()
            .unwrap_or(NonZeroUsize::MIN)
            .get(),
    };
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("solenoid-layer-{}", index))
        .build()
        .map_err(|e| SolenoidError::WorkerPool(e.to_string()))
}
