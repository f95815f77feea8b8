//! Monte Carlo solver core
//!
//! This crate runs iterative Monte Carlo simulations driven by a user-supplied
//! trial strategy (a [`Command`]). It provides:
//! - A solver that runs trials in caller-sized batches and tracks the
//!   cumulative iteration count
//! - Cooperative cancellation through a shared stop flag
//! - A named random generator registry that is sealed before the first trial
//!
//! ```ignore
//! use std::sync::Arc;
//! use mcsim_core::MonteCarloSolver;
//!
//! let command = Arc::new(MyCommand::default());
//! let mut solver = MonteCarloSolver::new(command.clone(), params)?;
//! let stop = solver.stop_handle();
//!
//! solver.solve(1_000)?;
//! println!("{:?} after {}", command.result(), solver.statistics().iterations_run());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod command;
pub mod error;
pub mod registry;
pub mod solver;
pub mod statistics;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use command::Command;
pub use error::{CommandError, RegistryError, SolverError};
pub use registry::{RandomRegistry, RegistryState};
pub use solver::{MonteCarloSolver, StopHandle};
pub use statistics::RunStatistics;
