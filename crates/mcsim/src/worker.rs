//! Background worker that runs a solver in chunks without blocking the caller.
//!
//! The worker thread calls [`MonteCarloSolver::solve`] with at most
//! `batch_size` iterations at a time, publishes a [`WorkerEvent::Progress`]
//! snapshot after every chunk and a [`WorkerEvent::Finished`] at the end, then
//! notifies every registered [`SimulationEndedListener`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use mcsim_core::{Command, MonteCarloSolver, SolverError, StopHandle};

/// Default number of iterations per `solve` call
pub const DEFAULT_BATCH_SIZE: u64 = 1_000;

/// Notified once when a worker run concludes, naturally or cancelled
pub trait SimulationEndedListener<C>: Send + Sync {
    fn simulation_ended(&self, command: &Arc<C>);
}

impl<C, F> SimulationEndedListener<C> for F
where
    F: Fn(&Arc<C>) + Send + Sync,
{
    fn simulation_ended(&self, command: &Arc<C>) {
        self(command)
    }
}

/// Identifies a registered listener for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Event published by the worker thread
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent<O> {
    /// A chunk finished
    Progress { completed: u64, total: u64, result: O },
    /// The run concluded
    Finished {
        completed: u64,
        cancelled: bool,
        failed_chunks: u64,
        result: O,
    },
}

struct Listeners<C> {
    concluded: bool,
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn SimulationEndedListener<C>>)>,
}

impl<C> Listeners<C> {
    fn new() -> Self {
        Self {
            concluded: false,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs a [`MonteCarloSolver`] on a dedicated thread
pub struct SimulationWorker<C: Command> {
    command: Arc<C>,
    events_rx: Receiver<WorkerEvent<C::Output>>,
    cancel_flag: Arc<AtomicBool>,
    stop: StopHandle,
    progress: Arc<AtomicU64>,
    total: u64,
    listeners: Arc<Mutex<Listeners<C>>>,
    thread: Option<JoinHandle<MonteCarloSolver<C>>>,
}

impl<C> SimulationWorker<C>
where
    C: Command + 'static,
    C::Output: Send + 'static,
{
    /// Start running `iterations` trials on a new thread.
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn start(
        solver: MonteCarloSolver<C>,
        iterations: u64,
        batch_size: u64,
    ) -> std::io::Result<Self> {
        let (events_tx, events_rx) = channel();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(AtomicU64::new(0));
        let listeners = Arc::new(Mutex::new(Listeners::new()));
        let command = solver.command().clone();
        let stop = solver.stop_handle();

        let ctx = WorkerContext {
            events_tx,
            cancel_flag: cancel_flag.clone(),
            progress: progress.clone(),
            listeners: listeners.clone(),
            total: iterations,
            batch_size: batch_size.max(1),
        };

        let thread = thread::Builder::new()
            .name("mcsim-worker".into())
            .spawn(move || ctx.run(solver))?;

        Ok(Self {
            command,
            events_rx,
            cancel_flag,
            stop,
            progress,
            total: iterations,
            listeners,
            thread: Some(thread),
        })
    }

    /// Register a listener. It is invoked right away if the run already ended.
    pub fn add_listener<L>(&self, listener: L) -> ListenerId
    where
        L: SimulationEndedListener<C> + 'static,
    {
        let listener: Arc<dyn SimulationEndedListener<C>> = Arc::new(listener);
        let (id, concluded) = {
            let mut listeners = lock(&self.listeners);
            let id = ListenerId(listeners.next_id);
            listeners.next_id += 1;
            listeners.entries.push((id, listener.clone()));
            (id, listeners.concluded)
        };

        if concluded {
            listener.simulation_ended(&self.command);
        }
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        listeners.entries.len() != before
    }

    /// Cancel the run. Trials already in flight finish; the rest are skipped.
    pub fn cancel(&self) {
        tracing::info!("Cancelling simulation");
        self.cancel_flag.store(true, Ordering::SeqCst);
        self.stop.stop();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    /// Whether the run has concluded and listeners were notified
    pub fn is_finished(&self) -> bool {
        lock(&self.listeners).concluded
    }

    /// Iterations handed to the solver so far
    pub fn progress(&self) -> u64 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn command(&self) -> &Arc<C> {
        &self.command
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv(&self) -> Option<WorkerEvent<C::Output>> {
        self.events_rx.try_recv().ok()
    }

    /// Wait for the next event. Returns None once the worker has exited and
    /// every event was received.
    pub fn recv(&self) -> Option<WorkerEvent<C::Output>> {
        self.events_rx.recv().ok()
    }

    /// Wait for the worker thread and take the solver back
    pub fn join(mut self) -> thread::Result<MonteCarloSolver<C>> {
        match self.thread.take() {
            Some(thread) => thread.join(),
            None => Err(Box::new("worker thread already joined")),
        }
    }
}

impl<C: Command> Drop for SimulationWorker<C> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.cancel_flag.store(true, Ordering::SeqCst);
            self.stop.stop();
            let _ = thread.join();
        }
    }
}

/// State moved onto the worker thread
struct WorkerContext<C: Command> {
    events_tx: Sender<WorkerEvent<C::Output>>,
    cancel_flag: Arc<AtomicBool>,
    progress: Arc<AtomicU64>,
    listeners: Arc<Mutex<Listeners<C>>>,
    total: u64,
    batch_size: u64,
}

impl<C: Command> WorkerContext<C> {
    fn run(self, mut solver: MonteCarloSolver<C>) -> MonteCarloSolver<C> {
        tracing::info!(
            iterations = self.total,
            batch_size = self.batch_size,
            resumed_from = solver.statistics().iterations_run(),
            "Starting Monte Carlo simulation"
        );

        let mut completed = 0u64;
        let mut failed_chunks = 0u64;

        while completed < self.total && !self.cancel_flag.load(Ordering::SeqCst) {
            let chunk = (self.total - completed).min(self.batch_size);
            match solver.solve(chunk) {
                Ok(()) => {}
                Err(SolverError::Stopped) => break,
                Err(e) => {
                    failed_chunks += 1;
                    tracing::error!(error = %e, chunk, completed, "Simulation chunk failed");
                }
            }

            completed += chunk;
            self.progress.store(completed, Ordering::SeqCst);
            let _ = self.events_tx.send(WorkerEvent::Progress {
                completed,
                total: self.total,
                result: solver.command().result(),
            });
        }

        let cancelled = self.cancel_flag.load(Ordering::SeqCst);
        tracing::info!(
            completed,
            cancelled,
            failed_chunks,
            iterations_run = solver.statistics().iterations_run(),
            "Simulation finished"
        );

        let _ = self.events_tx.send(WorkerEvent::Finished {
            completed,
            cancelled,
            failed_chunks,
            result: solver.command().result(),
        });

        let to_notify: Vec<_> = {
            let mut listeners = lock(&self.listeners);
            listeners.concluded = true;
            listeners
                .entries
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect()
        };
        for listener in to_notify {
            listener.simulation_ended(solver.command());
        }

        solver
    }
}
