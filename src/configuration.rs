//! Settings for the grid engine, and loading of complete run descriptions from file.

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{Field, GridFieldEngine};
use crate::error::{Result, SolenoidError};
use crate::grid::GridSpec;
use crate::magnetic::Solenoid;

/// Order of the points in a computed [Field].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrdering {
    /// Points are returned in the order workers complete them.
    Unordered,
    /// Points are returned in enumeration order.
    Indexed,
}

/// Settings of the worker pool that evaluates a grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfiguration {
    /// Number of worker threads computing points.
    pub workers: usize,

    /// Capacity of the bounded queues between producer, workers and collector.
    ///
    /// Defaults to twice the number of workers.
    pub queue_depth: Option<usize>,

    pub ordering: ResultOrdering,
}

/// Per default one worker runs per available core and results are unordered.
impl Default for EngineConfiguration {
    fn default() -> Self {
        EngineConfiguration {
            workers: std::thread::available_parallelism()
                .unwrap_or(NonZeroUsize::MIN)
                .get(),
            queue_depth: None,
            ordering: ResultOrdering::Unordered,
        }
    }
}

impl EngineConfiguration {
    pub fn with_workers(workers: usize) -> Self {
        EngineConfiguration {
            workers,
            ..Default::default()
        }
    }

    pub fn ordered(mut self) -> Self {
        self.ordering = ResultOrdering::Indexed;
        self
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth.unwrap_or(2 * self.workers)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SolenoidError::InvalidConfiguration(
                "at least one worker is required".to_string(),
            ));
        }
        if self.queue_depth == Some(0) {
            return Err(SolenoidError::InvalidConfiguration(
                "queue depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A complete run: the solenoid, the grid to sample and the engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub solenoid: Solenoid,
    pub grid: GridSpec,
    #[serde(default)]
    pub engine: EngineConfiguration,
}

/// A document that cannot be decoded is a configuration fault, whatever the format.
fn undecodable<E: std::fmt::Display>(error: E) -> SolenoidError {
    SolenoidError::InvalidConfiguration(error.to_string())
}

impl Simulation {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let simulation: Simulation = serde_json::from_str(json).map_err(undecodable)?;
        simulation.validate()?;
        Ok(simulation)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let simulation: Simulation = serde_yaml::from_str(yaml).map_err(undecodable)?;
        simulation.validate()?;
        Ok(simulation)
    }

    /// Loads a run description, choosing the format from the file extension
    /// (`.json`, `.yaml` or `.yml`).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("json") => Simulation::from_json_str(&contents),
            Some("yaml") | Some("yml") => Simulation::from_yaml_str(&contents),
            _ => Err(SolenoidError::InvalidConfiguration(format!(
                "cannot infer configuration format of {}",
                path.display()
            ))),
        }
    }

    /// Checks the grid and engine settings; the solenoid is validated on construction.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.engine.validate()
    }

    /// Computes the field of the solenoid over the grid.
    pub fn run(&self) -> Result<Field> {
        GridFieldEngine::new(&self.solenoid, self.engine.clone())?.compute_grid(&self.grid)
    }
}
