use serde::{Deserialize, Serialize};

/// Cumulative iteration bookkeeping for a solver.
///
/// Persist it with serde and hand it back to
/// [`MonteCarloSolver::with_statistics`](crate::solver::MonteCarloSolver::with_statistics)
/// to resume a previous run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    iterations_run: u64,
}

impl RunStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics resuming from a previously recorded iteration count
    #[must_use]
    pub fn resumed(iterations_run: u64) -> Self {
        Self { iterations_run }
    }

    /// Number of iterations requested so far, including skipped ones
    pub fn iterations_run(&self) -> u64 {
        self.iterations_run
    }

    pub fn set_iterations_run(&mut self, iterations_run: u64) {
        self.iterations_run = iterations_run;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        assert_eq!(RunStatistics::new().iterations_run(), 0);
        assert_eq!(RunStatistics::default(), RunStatistics::resumed(0));
    }

    #[test]
    fn test_set_iterations_run() {
        let mut stats = RunStatistics::resumed(40);
        stats.set_iterations_run(1_040);
        assert_eq!(stats.iterations_run(), 1_040);
    }
}
