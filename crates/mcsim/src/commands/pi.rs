use std::fmt;
use std::sync::Mutex;

use mcsim_core::{Command, CommandError, RandomRegistry, RunStatistics};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

/// Generator name registered by [`PiEstimate`]
pub const GENERATOR: &str = "u";

/// Snapshot of a pi estimation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PiResult {
    pub trials: u64,
    pub hits: u64,
    pub estimate: f64,
    pub std_error: f64,
}

impl fmt::Display for PiResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pi ~ {:.6} (se {:.6}, {} hits / {} trials)",
            self.estimate, self.std_error, self.hits, self.trials
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    trials: u64,
    hits: u64,
}

/// Estimates pi from uniform points falling inside the quarter circle
#[derive(Debug, Default)]
pub struct PiEstimate {
    tally: Mutex<Tally>,
}

impl Command for PiEstimate {
    /// Seed for the point generator
    type Parameters = Option<u64>;
    type Output = PiResult;
    type Rng = StdRng;

    fn init(
        &self,
        seed: Option<u64>,
        _statistics: &RunStatistics,
        registry: &mut RandomRegistry<StdRng>,
    ) -> Result<(), CommandError> {
        super::register_generator(registry, GENERATOR, seed)?;
        Ok(())
    }

    fn simulate(&self, registry: &mut RandomRegistry<StdRng>) -> Result<(), CommandError> {
        let rng = registry
            .get_random(GENERATOR)?
            .ok_or("pi generator not registered")?;
        let x: f64 = rng.random();
        let y: f64 = rng.random();

        let mut tally = self.tally.lock().map_err(|e| e.to_string())?;
        tally.trials += 1;
        if x * x + y * y <= 1.0 {
            tally.hits += 1;
        }
        Ok(())
    }

    fn result(&self) -> PiResult {
        let tally = match self.tally.lock() {
            Ok(tally) => *tally,
            Err(poisoned) => *poisoned.into_inner(),
        };
        if tally.trials == 0 {
            return PiResult::default();
        }

        let n = tally.trials as f64;
        let p = tally.hits as f64 / n;
        PiResult {
            trials: tally.trials,
            hits: tally.hits,
            estimate: 4.0 * p,
            std_error: 4.0 * (p * (1.0 - p) / n).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsim_core::MonteCarloSolver;
    use std::sync::Arc;

    #[test]
    fn test_empty_result() {
        assert_eq!(PiEstimate::default().result(), PiResult::default());
    }

    #[test]
    fn test_estimate_converges() {
        let command = Arc::new(PiEstimate::default());
        let mut solver = MonteCarloSolver::new(command.clone(), Some(2024)).unwrap();

        solver.solve(200_000).unwrap();

        let result = command.result();
        assert_eq!(result.trials, 200_000);
        assert!(result.hits <= result.trials);
        assert!(
            (result.estimate - std::f64::consts::PI).abs() < 5.0 * result.std_error,
            "estimate {} (se {})",
            result.estimate,
            result.std_error
        );
    }

    #[test]
    fn test_same_seed_same_result() {
        let run = |seed| {
            let command = Arc::new(PiEstimate::default());
            let mut solver = MonteCarloSolver::new(command.clone(), Some(seed)).unwrap();
            solver.solve(1_000).unwrap();
            solver.solve(1_000).unwrap();
            command.result()
        };

        assert_eq!(run(11), run(11));
    }
}
