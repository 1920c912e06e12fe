//! Evaluates the field of a solenoid over many points with a pool of worker threads.
//!
//! A producer thread enumerates points lazily into a bounded queue. Each of the `W`
//! workers pulls one point at a time, computes its field synchronously and pushes the
//! finished point into a bounded results queue, which the calling thread drains until
//! every worker has exited. Each point is handled by exactly one worker, so no state is
//! shared between the computations of different points.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::configuration::{EngineConfiguration, ResultOrdering};
use crate::error::{Result, SolenoidError};
use crate::grid::GridSpec;
use crate::magnetic::Solenoid;
use crate::point::FieldPoint;

/// A point tagged with its enumeration index.
type Task = (usize, FieldPoint);

/// Stop conditions shared by the producer and the workers of one run.
struct RunState<'t> {
    token: &'t CancellationToken,
    /// Lowest index of a point found on a winding, `usize::MAX` while there is none.
    singular: AtomicUsize,
}

impl<'t> RunState<'t> {
    fn new(token: &'t CancellationToken) -> Self {
        RunState {
            token,
            singular: AtomicUsize::new(usize::MAX),
        }
    }

    fn is_stopped(&self) -> bool {
        self.token.is_cancelled() || self.singular_point().is_some()
    }

    fn mark_singular(&self, index: usize) {
        self.singular.fetch_min(index, Ordering::SeqCst);
    }

    fn singular_point(&self) -> Option<usize> {
        match self.singular.load(Ordering::SeqCst) {
            usize::MAX => None,
            index => Some(index),
        }
    }
}

/// The computed field: one [FieldPoint] per sampled position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub points: Vec<FieldPoint>,
}

impl Field {
    pub fn new(points: Vec<FieldPoint>) -> Self {
        Field { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldPoint> {
        self.points.iter()
    }
}

/// A flag shared with a running computation to ask it to stop.
///
/// The producer and every worker check the flag between points.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Computes the field of a [Solenoid] over grids or lists of points.
pub struct GridFieldEngine<'a> {
    solenoid: &'a Solenoid,
    configuration: EngineConfiguration,
    cancellation: CancellationToken,
}

impl<'a> GridFieldEngine<'a> {
    /// Creates an engine, rejecting invalid worker settings.
    pub fn new(solenoid: &'a Solenoid, configuration: EngineConfiguration) -> Result<Self> {
        configuration.validate()?;
        Ok(GridFieldEngine {
            solenoid,
            configuration,
            cancellation: CancellationToken::new(),
        })
    }

    /// Observe `token` while computing; cancelling it aborts the computation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }

    /// Computes the field at every point of `grid`.
    ///
    /// The result holds exactly `grid.len()` points.
    pub fn compute_grid(&self, grid: &GridSpec) -> Result<Field> {
        grid.validate()?;
        self.run(grid.points(), grid.len())
    }

    /// Computes the field at each of `points`.
    ///
    /// With [ResultOrdering::Indexed] the points are returned in their original order.
    pub fn compute_points(&self, points: Vec<FieldPoint>) -> Result<Field> {
        let expected = points.len();
        self.run(points.into_iter().enumerate(), expected)
    }

    fn run<I>(&self, points: I, expected: usize) -> Result<Field>
    where
        I: Iterator<Item = Task> + Send,
    {
        let workers = self.configuration.workers;
        let queue_depth = self.configuration.queue_depth();
        info!(points = expected, workers, queue_depth, "computing solenoid field");
        let start = Instant::now();

        let solenoid = self.solenoid;
        let state = RunState::new(&self.cancellation);
        let state = &state;
        let (mut results, panicked) = thread::scope(|scope| {
            let (point_sender, point_receiver) = sync_channel::<Task>(queue_depth);
            let point_receiver = Arc::new(Mutex::new(point_receiver));
            let (result_sender, result_receiver) = sync_channel::<Task>(queue_depth);

            let producer = scope.spawn(move || produce(points, point_sender, state));
            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    let queue = Arc::clone(&point_receiver);
                    let results = result_sender.clone();
                    scope.spawn(move || run_worker(id, solenoid, &queue, results, state))
                })
                .collect();
            // Only the workers may keep the queues open, so the collector below stops once
            // they have all exited and the producer stops if they all disappear.
            drop(point_receiver);
            drop(result_sender);

            let mut collected = Vec::with_capacity(expected);
            collected.extend(result_receiver.iter());

            let mut panicked = false;
            match producer.join() {
                Ok(produced) => debug!(produced, "producer finished"),
                Err(_) => panicked = true,
            }
            for handle in handles {
                if handle.join().is_err() {
                    panicked = true;
                }
            }
            (collected, panicked)
        });

        if panicked {
            return Err(SolenoidError::WorkerPool(
                "a field worker thread panicked".to_string(),
            ));
        }
        if let Some(index) = state.singular_point() {
            warn!(index, "field computation aborted on a singular point");
            return Err(SolenoidError::SingularPoint { index });
        }
        if results.len() != expected {
            if state.token.is_cancelled() {
                info!(computed = results.len(), expected, "field computation cancelled");
                return Err(SolenoidError::Cancelled);
            }
            return Err(SolenoidError::WorkerPool(format!(
                "expected {} points but collected {}",
                expected,
                results.len()
            )));
        }

        if self.configuration.ordering == ResultOrdering::Indexed {
            results.sort_unstable_by_key(|(index, _)| *index);
        }
        info!(
            points = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "solenoid field computed"
        );
        Ok(Field::new(
            results.into_iter().map(|(_, point)| point).collect(),
        ))
    }
}

/// Feeds points into the bounded queue until they run out, the workers are gone or
/// the run is stopped. Returns the number of points queued.
fn produce<I>(points: I, queue: SyncSender<Task>, state: &RunState) -> usize
where
    I: Iterator<Item = Task>,
{
    let mut produced = 0;
    for task in points {
        if state.is_stopped() {
            debug!(produced, "producer observed a stopped run");
            break;
        }
        if queue.send(task).is_err() {
            break;
        }
        produced += 1;
    }
    produced
}

/// Pulls points one at a time, computes their field and hands them to the collector.
/// A point whose field is not finite lies on a winding and stops the run.
/// Returns the number of points computed.
fn run_worker(
    id: usize,
    solenoid: &Solenoid,
    queue: &Mutex<Receiver<Task>>,
    results: SyncSender<Task>,
    state: &RunState,
) -> usize {
    let mut computed = 0;
    while !state.is_stopped() {
        let task = match queue.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => break,
        };
        let (index, mut point) = match task {
            Ok(task) => task,
            Err(_) => break,
        };

        solenoid.compute_point(&mut point);
        if !point.magnitude().is_finite() {
            debug!(worker = id, index, %point, "non-finite field, the point lies on a winding");
            state.mark_singular(index);
            break;
        }
        if results.send((index, point)).is_err() {
            break;
        }
        computed += 1;
    }
    trace!(worker = id, computed, "worker finished");
    computed
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::constant::PI;
    use crate::grid::Boundary;
    use crate::point::PointRepresentation;
    use std::collections::HashSet;
    use std::time::Duration;

    fn solenoid() -> Solenoid {
        Solenoid::new(0.1, 0.12, 0.3, 50.0, 0.0, 20, 3).unwrap()
    }

    fn grid() -> GridSpec {
        GridSpec::new([0.0, 0.08], [0.0, 2.0 * PI], [-0.2, 0.2], [3, 4, 5])
            .unwrap()
            .with_boundary(Boundary::HalfOpen)
    }

    /// Positions are compared bitwise to detect duplicated or lost points.
    fn position_key(point: &FieldPoint) -> [u64; 3] {
        let position = point.position();
        [
            position.x.to_bits(),
            position.y.to_bits(),
            position.z.to_bits(),
        ]
    }

    #[test]
    fn test_every_point_is_computed_once() {
        let solenoid = solenoid();
        let grid = grid();
        let expected: HashSet<[u64; 3]> = grid.points().map(|(_, p)| position_key(&p)).collect();
        assert_eq!(expected.len(), grid.len());

        for &workers in &[1, 2, 4, 8, 16] {
            let engine =
                GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(workers))
                    .unwrap();
            let field = engine.compute_grid(&grid).unwrap();
            assert_eq!(field.len(), grid.len(), "{} workers", workers);
            let keys: HashSet<[u64; 3]> = field.iter().map(position_key).collect();
            assert_eq!(keys, expected, "{} workers", workers);
        }
    }

    #[test]
    fn test_indexed_results_match_sequential_computation() {
        let solenoid = solenoid();
        let grid = grid();
        let reference: Vec<FieldPoint> = grid
            .points()
            .map(|(_, mut point)| {
                solenoid.compute_point(&mut point);
                point
            })
            .collect();

        for &workers in &[1, 3, 8] {
            let configuration = EngineConfiguration::with_workers(workers).ordered();
            let field = GridFieldEngine::new(&solenoid, configuration)
                .unwrap()
                .compute_grid(&grid)
                .unwrap();
            assert_eq!(field.points, reference);
        }
    }

    #[test]
    fn test_small_queue_and_many_workers() {
        let solenoid = solenoid();
        let grid = grid();
        let configuration = EngineConfiguration {
            workers: 16,
            queue_depth: Some(1),
            ordering: ResultOrdering::Indexed,
        };
        let field = GridFieldEngine::new(&solenoid, configuration)
            .unwrap()
            .compute_grid(&grid)
            .unwrap();
        assert_eq!(field.len(), grid.len());
    }

    #[test]
    fn test_compute_points_keeps_representation() {
        let solenoid = solenoid();
        let points = vec![
            FieldPoint::cartesian(0.0, 0.0, 0.0),
            FieldPoint::polar(0.05, 1.0, 0.1),
            FieldPoint::cartesian(0.03, -0.02, -0.05),
        ];
        let field = GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(2).ordered())
            .unwrap()
            .compute_points(points.clone())
            .unwrap();
        for (input, output) in points.iter().zip(field.iter()) {
            assert_eq!(input.representation(), output.representation());
            assert_eq!(input.position(), output.position());
            assert_eq!(output.field(), solenoid.field_at(input));
        }
        assert_eq!(field.points[0].cartesian_field().x, 0.0);
        assert_eq!(field.points[0].cartesian_field().y, 0.0);
    }

    #[test]
    fn test_cartesian_grid() {
        let solenoid = solenoid();
        let grid = grid().with_representation(PointRepresentation::Cartesian);
        let field = GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(4))
            .unwrap()
            .compute_grid(&grid)
            .unwrap();
        assert_eq!(field.len(), grid.len());
        assert!(field
            .iter()
            .all(|point| point.representation() == PointRepresentation::Cartesian));
    }

    #[test]
    fn test_empty_point_list() {
        let solenoid = solenoid();
        let field = GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(4))
            .unwrap()
            .compute_points(Vec::new())
            .unwrap();
        assert!(field.is_empty());
    }

    #[test]
    fn test_cancelled_computation_returns_no_field() {
        let solenoid = solenoid();
        let token = CancellationToken::new();
        token.cancel();
        let result = GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(4))
            .unwrap()
            .with_cancellation(token)
            .compute_grid(&grid());
        assert!(matches!(result, Err(SolenoidError::Cancelled)));
    }

    #[test]
    fn test_cancellation_while_running() {
        let solenoid = Solenoid::new(0.25, 0.28, 1.31, 200.0, 0.0, 768, 64).unwrap();
        let grid = GridSpec::new([0.0, 0.2], [0.0, 0.0], [-0.5, 0.5], [10, 1, 200]).unwrap();
        let token = CancellationToken::new();
        let engine = GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(2))
            .unwrap()
            .with_cancellation(token.clone());

        let result = thread::scope(|scope| {
            let run = scope.spawn(|| engine.compute_grid(&grid));
            thread::sleep(Duration::from_millis(50));
            token.cancel();
            run.join().unwrap()
        });
        assert!(matches!(result, Err(SolenoidError::Cancelled)));
    }

    #[test]
    fn test_point_on_a_winding_aborts_the_run() {
        let solenoid = Solenoid::new(0.1, 0.1, 0.2, 1.0, 0.0, 4, 1).unwrap();
        let winding = FieldPoint::polar(solenoid.layer_radius(0), 0.0, solenoid.loop_position(0));
        assert!(!solenoid.field_at(&winding).norm().is_finite());

        for &workers in &[1, 2, 4] {
            let points = vec![
                FieldPoint::polar(0.0, 0.0, 0.0),
                FieldPoint::cartesian(0.05, 0.02, 0.1),
                winding,
                FieldPoint::polar(0.2, 1.0, -0.3),
            ];
            let result = GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(workers))
                .unwrap()
                .compute_points(points);
            assert!(matches!(
                result,
                Err(SolenoidError::SingularPoint { index: 2 })
            ));
        }
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let solenoid = solenoid();
        assert!(matches!(
            GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(0)),
            Err(SolenoidError::InvalidConfiguration(_))
        ));

        let mut grid = grid();
        grid.nz = 0;
        let engine =
            GridFieldEngine::new(&solenoid, EngineConfiguration::with_workers(2)).unwrap();
        assert!(matches!(
            engine.compute_grid(&grid),
            Err(SolenoidError::InvalidGrid(_))
        ));
    }
}
