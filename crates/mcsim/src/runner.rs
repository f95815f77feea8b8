//! Drives a command through the background worker and collects the outcome.

use std::sync::Arc;

use color_eyre::eyre::{WrapErr, eyre};
use mcsim_core::{Command, MonteCarloSolver, RunStatistics};
use serde::Serialize;

use crate::commands::{DiceParams, DiceRoll, PiEstimate};
use crate::config::{CommandKind, RunConfig};
use crate::worker::{SimulationWorker, WorkerEvent};

/// Final outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary<O> {
    pub command: CommandKind,
    /// Iterations the worker handed to the solver in this run
    pub completed: u64,
    /// Cumulative count recorded by the solver, including resumed iterations
    pub iterations_run: u64,
    pub cancelled: bool,
    pub failed_chunks: u64,
    pub result: O,
}

/// Run `command` as configured, calling `on_event` for every worker event
pub fn run_command<C, F>(
    kind: CommandKind,
    command: Arc<C>,
    parameters: C::Parameters,
    config: &RunConfig,
    mut on_event: F,
) -> color_eyre::Result<RunSummary<C::Output>>
where
    C: Command + 'static,
    C::Output: Send + 'static,
    F: FnMut(&WorkerEvent<C::Output>),
{
    let statistics = RunStatistics::resumed(config.resume_from.unwrap_or(0));
    let solver = MonteCarloSolver::with_statistics(command, parameters, statistics)
        .wrap_err_with(|| format!("failed to initialize {kind} command"))?;

    let worker = SimulationWorker::start(solver, config.iterations, config.batch_size)
        .wrap_err("failed to spawn worker thread")?;

    let mut finished = None;
    while let Some(event) = worker.recv() {
        on_event(&event);
        if let WorkerEvent::Finished {
            completed,
            cancelled,
            failed_chunks,
            result,
        } = event
        {
            finished = Some((completed, cancelled, failed_chunks, result));
        }
    }

    let solver = worker
        .join()
        .map_err(|_| eyre!("worker thread panicked"))?;
    let (completed, cancelled, failed_chunks, result) =
        finished.ok_or_else(|| eyre!("worker exited without finishing"))?;

    Ok(RunSummary {
        command: kind,
        completed,
        iterations_run: solver.statistics().iterations_run(),
        cancelled,
        failed_chunks,
        result,
    })
}

/// Summary of either sample command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnySummary {
    Pi(RunSummary<crate::commands::PiResult>),
    Dice(RunSummary<crate::commands::DiceResult>),
}

impl AnySummary {
    pub fn cancelled(&self) -> bool {
        match self {
            AnySummary::Pi(s) => s.cancelled,
            AnySummary::Dice(s) => s.cancelled,
        }
    }
}

impl std::fmt::Display for AnySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn write_summary<O: std::fmt::Display>(
            f: &mut std::fmt::Formatter<'_>,
            s: &RunSummary<O>,
        ) -> std::fmt::Result {
            writeln!(f, "{}: {}", s.command, s.result)?;
            write!(
                f,
                "completed {} iterations ({} total)",
                s.completed, s.iterations_run
            )?;
            if s.failed_chunks > 0 {
                write!(f, ", {} failed chunks", s.failed_chunks)?;
            }
            if s.cancelled {
                write!(f, ", cancelled")?;
            }
            Ok(())
        }

        match self {
            AnySummary::Pi(s) => write_summary(f, s),
            AnySummary::Dice(s) => write_summary(f, s),
        }
    }
}

/// Run the sample command selected by `config`.
///
/// `on_progress` receives `(completed, total, result)` as text after every chunk.
pub fn run_configured(
    config: &RunConfig,
    mut on_progress: impl FnMut(u64, u64, String),
) -> color_eyre::Result<AnySummary> {
    config.validate()?;

    match config.command {
        CommandKind::Pi => {
            let summary = run_command(
                CommandKind::Pi,
                Arc::new(PiEstimate::default()),
                config.seed,
                config,
                |event| forward_progress(event, &mut on_progress),
            )?;
            Ok(AnySummary::Pi(summary))
        }
        CommandKind::Dice => {
            let params = DiceParams {
                sides: config.dice.sides,
                count: config.dice.count,
                seed: config.seed,
            };
            let summary = run_command(
                CommandKind::Dice,
                Arc::new(DiceRoll::default()),
                params,
                config,
                |event| forward_progress(event, &mut on_progress),
            )?;
            Ok(AnySummary::Dice(summary))
        }
    }
}

fn forward_progress<O: std::fmt::Display>(
    event: &WorkerEvent<O>,
    on_progress: &mut impl FnMut(u64, u64, String),
) {
    if let WorkerEvent::Progress {
        completed,
        total,
        result,
    } = event
    {
        on_progress(*completed, *total, result.to_string());
    }
}
