use std::fmt;
use std::sync::{Mutex, OnceLock};

use mcsim_core::{Command, CommandError, RandomRegistry, RunStatistics};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};
use serde::Serialize;

use super::RunningMean;

/// Generator name registered by [`DiceRoll`]
pub const GENERATOR: &str = "dice";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceParams {
    pub sides: u32,
    pub count: u32,
    pub seed: Option<u64>,
}

/// Snapshot of a dice run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DiceResult {
    pub trials: u64,
    pub mean: f64,
    pub variance: f64,
    pub std_error: f64,
}

impl fmt::Display for DiceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean total {:.4} (se {:.4}, variance {:.4}, {} trials)",
            self.mean, self.std_error, self.variance, self.trials
        )
    }
}

#[derive(Debug)]
struct Dice {
    face: Uniform<u32>,
    sides: u32,
    count: u32,
}

/// Rolls `count` dice per trial and tracks the distribution of their total
#[derive(Debug, Default)]
pub struct DiceRoll {
    dice: OnceLock<Dice>,
    totals: Mutex<RunningMean>,
}

impl DiceRoll {
    /// Expected total of one trial, once initialized
    pub fn expected_total(&self) -> Option<f64> {
        self.dice
            .get()
            .map(|dice| f64::from(dice.count) * (f64::from(dice.sides) + 1.0) / 2.0)
    }
}

impl Command for DiceRoll {
    type Parameters = DiceParams;
    type Output = DiceResult;
    type Rng = StdRng;

    fn init(
        &self,
        params: DiceParams,
        _statistics: &RunStatistics,
        registry: &mut RandomRegistry<StdRng>,
    ) -> Result<(), CommandError> {
        if params.count == 0 {
            return Err("dice count must be at least 1".into());
        }
        let face = Uniform::new_inclusive(1, params.sides)?;
        self.dice
            .set(Dice {
                face,
                sides: params.sides,
                count: params.count,
            })
            .map_err(|_| "dice command initialized twice")?;

        super::register_generator(registry, GENERATOR, params.seed)?;
        Ok(())
    }

    fn simulate(&self, registry: &mut RandomRegistry<StdRng>) -> Result<(), CommandError> {
        let dice = self.dice.get().ok_or("dice command not initialized")?;
        let rng = registry
            .get_random(GENERATOR)?
            .ok_or("dice generator not registered")?;

        // u32 faces times a u32 count always fits in u64
        let mut total = 0u64;
        for _ in 0..dice.count {
            total += u64::from(dice.face.sample(&mut *rng));
        }

        self.totals
            .lock()
            .map_err(|e| e.to_string())?
            .push(total as f64);
        Ok(())
    }

    fn result(&self) -> DiceResult {
        let totals = match self.totals.lock() {
            Ok(totals) => *totals,
            Err(poisoned) => *poisoned.into_inner(),
        };
        DiceResult {
            trials: totals.count(),
            mean: totals.mean(),
            variance: totals.variance(),
            std_error: totals.std_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsim_core::{MonteCarloSolver, SolverError};
    use std::sync::Arc;

    fn params(sides: u32, count: u32) -> DiceParams {
        DiceParams {
            sides,
            count,
            seed: Some(5),
        }
    }

    #[test]
    fn test_two_dice_mean() {
        let command = Arc::new(DiceRoll::default());
        let mut solver = MonteCarloSolver::new(command.clone(), params(6, 2)).unwrap();
        assert_eq!(command.expected_total(), Some(7.0));

        solver.solve(50_000).unwrap();

        let result = command.result();
        assert_eq!(result.trials, 50_000);
        assert!(
            (result.mean - 7.0).abs() < 5.0 * result.std_error,
            "mean {} (se {})",
            result.mean,
            result.std_error
        );
        // Var of the sum of two d6 is 35/6
        assert!((result.variance - 35.0 / 6.0).abs() < 0.2);
    }

    #[test]
    fn test_zero_sided_die_rejected() {
        let err = MonteCarloSolver::new(Arc::new(DiceRoll::default()), params(0, 1)).unwrap_err();
        assert!(matches!(err, SolverError::Command(_)));
    }

    #[test]
    fn test_zero_dice_rejected() {
        let command = Arc::new(DiceRoll::default());
        let err = MonteCarloSolver::new(command.clone(), params(6, 0)).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
        assert_eq!(command.expected_total(), None);
    }

    #[test]
    fn test_reusing_command_fails() {
        let command = Arc::new(DiceRoll::default());
        MonteCarloSolver::new(command.clone(), params(6, 1)).unwrap();

        let err = MonteCarloSolver::new(command, params(6, 1)).unwrap_err();
        assert!(err.to_string().contains("initialized twice"));
    }

    #[test]
    fn test_totals_stay_in_range() {
        let command = Arc::new(DiceRoll::default());
        let mut solver = MonteCarloSolver::new(command.clone(), params(4, 3)).unwrap();
        solver.solve(1_000).unwrap();

        let result = command.result();
        assert!(result.mean >= 3.0 && result.mean <= 12.0);
    }

    #[test]
    fn test_huge_dice_totals_do_not_wrap() {
        let command = Arc::new(DiceRoll::default());
        let mut solver = MonteCarloSolver::new(command.clone(), params(u32::MAX, 2)).unwrap();
        solver.solve(1_000).unwrap();

        let result = command.result();
        let max_total = 2.0 * f64::from(u32::MAX);
        assert_eq!(result.trials, 1_000);
        assert!(result.mean >= 2.0 && result.mean <= max_total);
        // Expected total is u32::MAX + 1; a wrapped sum would pull the mean far below it
        assert!(
            (result.mean - f64::from(u32::MAX)).abs() < 0.1 * f64::from(u32::MAX),
            "mean {}",
            result.mean
        );
    }
}
