//! Tests for stopping a solve from another thread
//!
//! The iteration count always advances by the full batch, even when trials
//! were skipped after the stop request.

use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::thread;

use super::common::{Gate, Recording, RecordingParams};
use crate::command::Command;
use crate::error::SolverError;
use crate::solver::MonteCarloSolver;

const PARAMS: RecordingParams = RecordingParams { seed: 9 };

/// Stop lands exactly after a known trial
#[test]
fn test_stop_mid_batch_counts_full_batch() {
    let (reached_tx, reached_rx) = channel();
    let (resume_tx, resume_rx) = channel();
    let command = Arc::new(Recording::gated(Gate {
        at_call: 250,
        reached: reached_tx,
        resume: Mutex::new(resume_rx),
    }));

    let mut solver = MonteCarloSolver::new(command.clone(), PARAMS).unwrap();
    solver.solve(100).unwrap();
    let stop = solver.stop_handle();

    let worker = thread::spawn(move || {
        let outcome = solver.solve(1_000);
        (solver, outcome)
    });

    reached_rx.recv().unwrap();
    stop.stop();
    resume_tx.send(()).unwrap();

    let (mut solver, outcome) = worker.join().unwrap();
    outcome.unwrap();

    assert_eq!(command.calls(), 250);
    assert_eq!(solver.statistics().iterations_run(), 1_100);
    assert!(matches!(solver.solve(1), Err(SolverError::Stopped)));
}

/// Free-running race: however many trials ran, the batch is counted in full
#[test]
fn test_stop_race_from_other_thread() {
    let command = Arc::new(Recording::default());
    let mut solver = MonteCarloSolver::new(command.clone(), PARAMS).unwrap();
    let stop = solver.stop_handle();

    let worker = thread::spawn(move || {
        let outcome = solver.solve(1_000);
        (solver, outcome)
    });

    stop.stop();

    let (solver, outcome) = worker.join().unwrap();

    // Either the stop landed before solve began, or the batch ran to the end
    // of its step range with some trials skipped.
    match outcome {
        Ok(()) => assert_eq!(solver.statistics().iterations_run(), 1_000),
        Err(SolverError::Stopped) => {
            assert_eq!(solver.statistics().iterations_run(), 0);
            assert_eq!(command.calls(), 0);
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
    assert!(command.calls() <= 1_000);
    assert!(solver.is_stopped());
}

/// Results can be read while a batch is running
#[test]
fn test_result_readable_during_solve() {
    let (reached_tx, reached_rx) = channel();
    let (resume_tx, resume_rx) = channel();
    let command = Arc::new(Recording::gated(Gate {
        at_call: 10,
        reached: reached_tx,
        resume: Mutex::new(resume_rx),
    }));

    let mut solver = MonteCarloSolver::new(command.clone(), PARAMS).unwrap();
    let worker = thread::spawn(move || solver.solve(50).map(|()| solver));

    reached_rx.recv().unwrap();
    assert_eq!(command.result(), 10);
    resume_tx.send(()).unwrap();

    let solver = worker.join().unwrap().unwrap();
    assert_eq!(command.result(), 50);
    assert_eq!(solver.statistics().iterations_run(), 50);
}
