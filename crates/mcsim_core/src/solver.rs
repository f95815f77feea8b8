//! Solver orchestration loop and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::command::Command;
use crate::error::{Result, SolverError};
use crate::registry::RandomRegistry;
use crate::statistics::RunStatistics;

/// Cloneable handle that stops a solver from another thread
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the solver to stop. Does not wait for an in-flight `solve`.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::Relaxed) {
            tracing::debug!("Solver stop requested");
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Drives a [`Command`] through batches of trials.
///
/// The registry is sealed before construction returns. Only one `solve` can be
/// in flight at a time since it borrows the solver mutably; use a
/// [`StopHandle`] to cancel it from elsewhere.
pub struct MonteCarloSolver<C: Command> {
    command: Arc<C>,
    statistics: RunStatistics,
    registry: RandomRegistry<C::Rng>,
    stop: StopHandle,
}

impl<C: Command> MonteCarloSolver<C> {
    /// Build a solver with fresh statistics
    pub fn new(command: Arc<C>, parameters: C::Parameters) -> Result<Self> {
        Self::with_statistics(command, parameters, RunStatistics::new())
    }

    /// Build a solver that continues counting from `statistics`
    pub fn with_statistics(
        command: Arc<C>,
        parameters: C::Parameters,
        statistics: RunStatistics,
    ) -> Result<Self> {
        let mut registry = RandomRegistry::new();
        command
            .init(parameters, &statistics, &mut registry)
            .map_err(SolverError::from)?;
        registry.seal();

        tracing::debug!(
            iterations_run = statistics.iterations_run(),
            generators = registry.len(),
            "Solver created"
        );

        Ok(Self {
            command,
            statistics,
            registry,
            stop: StopHandle::new(),
        })
    }

    /// Run `iterations` steps of the simulation.
    ///
    /// Steps reached after a stop request skip their trial but are still
    /// counted: the iteration count always grows by the full `iterations` once
    /// the loop finishes. If a trial fails, the error is returned right away
    /// and the count is left untouched for the whole batch.
    pub fn solve(&mut self, iterations: u64) -> Result<()> {
        if self.stop.is_stopped() {
            return Err(SolverError::Stopped);
        }

        let start = self.statistics.iterations_run();
        let end = start
            .checked_add(iterations)
            .ok_or(SolverError::IterationOverflow {
                iterations_run: start,
                requested: iterations,
            })?;

        let mut skipped = 0u64;
        for _ in start..end {
            if self.stop.is_stopped() {
                skipped += 1;
                continue;
            }
            self.command
                .simulate(&mut self.registry)
                .map_err(SolverError::from)?;
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Trials skipped after stop request");
        }
        tracing::trace!(from = start, to = end, "Batch solved");

        self.statistics.set_iterations_run(end);
        Ok(())
    }

    /// Stop the solver. Later calls to [`solve`](Self::solve) fail with
    /// [`SolverError::Stopped`].
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Handle sharing this solver's stop flag
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn command(&self) -> &Arc<C> {
        &self.command
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    pub fn registry(&self) -> &RandomRegistry<C::Rng> {
        &self.registry
    }
}

impl<C: Command> std::fmt::Debug for MonteCarloSolver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonteCarloSolver")
            .field("statistics", &self.statistics)
            .field("generators", &self.registry.len())
            .field("stopped", &self.stop.is_stopped())
            .finish_non_exhaustive()
    }
}
