//! Magnetic fields of tightly wound solenoids.
//!
//! The field of every circular winding is evaluated with the exact closed-form solution in
//! terms of complete elliptic integrals, so there is no discretisation error. Fields are
//! sampled over grids in cylindrical polar coordinates by a bounded pool of worker threads.
//!
//! Calculations assume perfectly circular windings whose magnetic axis is the z axis.
//! The mathematics is described in <https://ntrs.nasa.gov/citations/20140002333>.

pub mod configuration;
pub mod constant;
pub mod coordinates;
pub mod engine;
pub mod error;
pub mod grid;
pub mod magnetic;
pub mod maths;
pub mod output;
pub mod point;

mod integration_tests;

pub use configuration::{EngineConfiguration, ResultOrdering, Simulation};
pub use engine::{CancellationToken, Field, GridFieldEngine};
pub use error::{Result, SolenoidError};
pub use grid::{Boundary, GridSpec};
pub use magnetic::{CurrentLoop, Solenoid, SolenoidBuilder};
pub use point::{FieldPoint, PointRepresentation};
