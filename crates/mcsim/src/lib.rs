//! Monte Carlo simulation runner
//!
//! Builds on [`mcsim_core`] with:
//! - A background worker that solves in chunks, publishes progress and
//!   notifies simulation-ended listeners
//! - Sample commands (pi estimation, dice totals)
//! - YAML run configuration and file logging for the `mcsim` binary

#![warn(clippy::all)]

pub mod commands;
pub mod config;
pub mod logging;
pub mod runner;
pub mod worker;

pub use config::{CommandKind, ConfigError, RunConfig};
pub use logging::init_logging;
pub use runner::{AnySummary, RunSummary, run_command, run_configured};
pub use worker::{ListenerId, SimulationEndedListener, SimulationWorker, WorkerEvent};
