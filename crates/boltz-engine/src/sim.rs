//! Run controller: owns the worker pool, drives steps, publishes results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use boltz_lattice::{CollideStream, ObstacleMask};
use log::{debug, error, info};
use parking_lot::Mutex;

use crate::barrier::StepBarrier;
use crate::buffer::{GridBuffers, LatticeView};
use crate::config::SimConfig;
use crate::error::{EngineError, Result};
use crate::results::{extract_into, ScalarField};
use crate::worker::{column_ranges, worker_loop};
use crate::StepKernel;

/// State shared by the controller, the workers and any handles.
pub(crate) struct RunContext {
    pub(crate) barrier: StepBarrier,
    pub(crate) buffers: GridBuffers,
    running: AtomicBool,
    finished: AtomicBool,
    steps: AtomicU64,
    results: Mutex<ScalarField>,
}

impl RunContext {
    /// The "keep simulating" flag; workers re-check it at every activation.
    pub(crate) fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// A running simulation: a fixed pool of persistent workers advancing the
/// double-buffered grid one barrier cycle per step, and a driver thread
/// pacing them.
///
/// Dropping the simulation stops it and joins every thread.
pub struct Simulation {
    ctx: Arc<RunContext>,
    driver: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl Simulation {
    /// Validate the configuration, build the grids from the obstacle mask
    /// and start the pool.
    pub fn start(config: SimConfig, obstacles: ObstacleMask) -> Result<Self> {
        if obstacles.rows() == 0 || obstacles.cols() == 0 {
            return Err(EngineError::EmptyGrid {
                rows: obstacles.rows(),
                cols: obstacles.cols(),
            });
        }
        let kernel = CollideStream::new(Arc::new(obstacles), config.flow_params());
        Self::start_with_kernel(config, kernel)
    }

    /// Start the pool around a custom step rule.
    ///
    /// The kernel's `init` fixes the grid dimensions; each worker runs its
    /// own clone. The physics-free schedule (barrier cycles, swaps, result
    /// refreshes, shutdown) is exactly as in [`Simulation::start`].
    pub fn start_with_kernel<K>(config: SimConfig, kernel: K) -> Result<Self>
    where
        K: StepKernel + Clone,
    {
        config.validate()?;
        let initial = kernel.init();
        let (rows, cols) = (initial.rows(), initial.cols());
        let ctx = Arc::new(RunContext {
            barrier: StepBarrier::new(config.num_threads),
            buffers: GridBuffers::new(initial),
            running: AtomicBool::new(true),
            finished: AtomicBool::new(false),
            steps: AtomicU64::new(0),
            results: Mutex::new(ScalarField::zeroed(rows, cols)),
        });
        // SAFETY: no other thread exists yet; the views go to the pool and
        // the driver, which follow the buffer role protocol from here on.
        let (read_view, write_view) = unsafe { ctx.buffers.views() };

        info!(
            "starting run: {rows}x{cols} grid, {} workers, {:?} results",
            config.num_threads, config.results_mode
        );

        let mut workers = Vec::with_capacity(config.num_threads);
        for (id, range) in column_ranges(cols, config.num_threads).into_iter().enumerate() {
            let worker_ctx = Arc::clone(&ctx);
            let worker_kernel = kernel.clone();
            let spawned = thread::Builder::new()
                .name(format!("lbm-worker-{id}"))
                .spawn(move || {
                    worker_loop(&worker_ctx, id, worker_kernel, read_view, write_view, range)
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    abort_spawn(&ctx, workers);
                    return Err(EngineError::Spawn(e));
                }
            }
        }

        let driver = {
            let driver_ctx = Arc::clone(&ctx);
            let driver_config = config.clone();
            thread::Builder::new()
                .name("lbm-driver".into())
                .spawn(move || drive(&driver_ctx, &driver_config, read_view, write_view))
        };
        let driver = match driver {
            Ok(handle) => handle,
            Err(e) => {
                abort_spawn(&ctx, workers);
                return Err(EngineError::Spawn(e));
            }
        };

        Ok(Self {
            ctx,
            driver: Some(driver),
            workers,
        })
    }

    /// Cloneable live control surface for this run.
    pub fn handle(&self) -> SimHandle {
        SimHandle {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Completed steps so far.
    pub fn steps(&self) -> u64 {
        self.ctx.steps.load(Ordering::Relaxed)
    }

    /// Copy of the last refreshed results field.
    pub fn snapshot(&self) -> ScalarField {
        self.ctx.results.lock().clone()
    }

    /// True once the driver has wound the run down.
    pub fn is_finished(&self) -> bool {
        self.ctx.finished.load(Ordering::SeqCst)
    }

    /// Clear the "keep simulating" flag without blocking.
    pub fn request_stop(&self) {
        self.ctx.request_stop();
    }

    /// Stop the run and join every thread. Idempotent.
    pub fn stop(&mut self) {
        self.ctx.request_stop();
        self.join_threads();
    }

    /// Block until the run ends on its own.
    ///
    /// Only returns if `max_steps` is configured or some handle requests a
    /// stop; with neither, the run (and this call) continues indefinitely.
    pub fn wait(&mut self) {
        self.join_threads();
    }

    fn join_threads(&mut self) {
        if let Some(driver) = self.driver.take() {
            if driver.join().is_err() {
                error!("driver thread panicked");
            }
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Live view of a running simulation, detached from its owner.
#[derive(Clone)]
pub struct SimHandle {
    ctx: Arc<RunContext>,
}

impl SimHandle {
    /// Ask the run to stop after the step in flight.
    pub fn request_stop(&self) {
        self.ctx.request_stop();
    }

    pub fn steps(&self) -> u64 {
        self.ctx.steps.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ScalarField {
        self.ctx.results.lock().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.ctx.finished.load(Ordering::SeqCst)
    }
}

/// Tear down a partially spawned pool after a spawn failure.
fn abort_spawn(ctx: &RunContext, workers: Vec<JoinHandle<()>>) {
    ctx.request_stop();
    ctx.barrier.release_all();
    for worker in workers {
        let _ = worker.join();
    }
}

/// The step loop: one barrier cycle per step, role swap, periodic and
/// final result extraction, cooperative shutdown.
fn drive(ctx: &RunContext, config: &SimConfig, mut read: LatticeView, mut write: LatticeView) {
    let mut step: u64 = 0;
    loop {
        if config.max_steps.is_some_and(|max| step >= max) {
            // Natural finish: publish the final state before stopping.
            // SAFETY: workers are parked between cycles, so the controller
            // has the buffers to itself.
            let grid = unsafe { read.as_lattice_ref() };
            extract_into(&mut ctx.results.lock(), grid, config.results_mode, config.boundary);
            ctx.request_stop();
            break;
        }

        ctx.barrier.release_all();
        ctx.barrier.wait_all_done();
        if !ctx.running() {
            break;
        }

        // All bands are written; exchange the grid roles for the next step.
        std::mem::swap(&mut read, &mut write);
        step += 1;
        ctx.steps.store(step, Ordering::Relaxed);

        if step > config.warmup_steps && step % config.refresh_steps == 0 {
            // SAFETY: as above, no worker touches the buffers between the
            // rendezvous and the next release.
            let grid = unsafe { read.as_lattice_ref() };
            extract_into(&mut ctx.results.lock(), grid, config.results_mode, config.boundary);
            debug!("results refreshed at step {step}");
        }
    }

    // One more release so parked workers observe the cleared flag and exit.
    ctx.barrier.release_all();
    ctx.finished.store(true, Ordering::SeqCst);
    info!("run finished after {step} steps");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_rejects_bad_config_before_spawning() {
        let mut config = SimConfig::default();
        config.num_threads = 0;
        let result = Simulation::start(config, ObstacleMask::open(8, 8));
        assert!(matches!(result, Err(EngineError::NoWorkers)));
    }

    #[test]
    fn test_start_rejects_empty_grid() {
        let result = Simulation::start(SimConfig::default(), ObstacleMask::open(0, 8));
        assert!(matches!(result, Err(EngineError::EmptyGrid { .. })));
    }

    #[test]
    fn test_zero_max_steps_finishes_without_stepping() {
        let mut config = SimConfig::default();
        config.num_threads = 2;
        config.max_steps = Some(0);
        let mut sim = Simulation::start(config, ObstacleMask::open(6, 6)).unwrap();
        sim.wait();
        assert!(sim.is_finished());
        assert_eq!(sim.steps(), 0);
        // The final extraction still ran, over the initial state.
        let field = sim.snapshot();
        assert!((field.at(3, 3) - 1.0).abs() < 1e-12);
    }
}
