//! The pluggable trial strategy driven by the solver.

use crate::error::CommandError;
use crate::registry::RandomRegistry;
use crate::statistics::RunStatistics;

/// A Monte Carlo trial strategy.
///
/// The solver holds the command behind an `Arc`, so every method takes
/// `&self`. Implementations keep their running results behind their own
/// synchronization: [`Command::result`] may be called from another thread
/// while [`Command::simulate`] is running.
pub trait Command: Send + Sync {
    /// Strategy-defined configuration, passed through to [`Command::init`] untouched
    type Parameters;

    /// Snapshot returned by [`Command::result`]
    type Output;

    /// Generator type stored in the registry
    type Rng: Send;

    /// Called exactly once before the registry is sealed.
    ///
    /// This is the only point where generators can be registered.
    fn init(
        &self,
        parameters: Self::Parameters,
        statistics: &RunStatistics,
        registry: &mut RandomRegistry<Self::Rng>,
    ) -> Result<(), CommandError>;

    /// Perform exactly one trial
    fn simulate(&self, registry: &mut RandomRegistry<Self::Rng>) -> Result<(), CommandError>;

    /// Current result snapshot
    fn result(&self) -> Self::Output;
}
