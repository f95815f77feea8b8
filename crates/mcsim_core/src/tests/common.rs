//! Shared test commands

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::command::Command;
use crate::error::CommandError;
use crate::registry::RandomRegistry;
use crate::statistics::RunStatistics;

/// Parameters for [`Recording`]
#[derive(Debug, Clone, Copy)]
pub struct RecordingParams {
    pub seed: u64,
}

/// Blocks one trial until the test thread lets it continue
pub struct Gate {
    pub at_call: u64,
    pub reached: Sender<()>,
    pub resume: Mutex<Receiver<()>>,
}

/// Command that records how it was driven
#[derive(Default)]
pub struct Recording {
    pub calls: AtomicU64,
    pub init_calls: AtomicU64,
    pub seen_iterations_at_init: AtomicU64,
    pub last_draw: Mutex<Option<f64>>,
    pub fail_at_call: Option<u64>,
    pub gate: Option<Gate>,
}

impl Recording {
    pub fn failing_at(call: u64) -> Self {
        Self {
            fail_at_call: Some(call),
            ..Default::default()
        }
    }

    pub fn gated(gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Command for Recording {
    type Parameters = RecordingParams;
    type Output = u64;
    type Rng = StdRng;

    fn init(
        &self,
        parameters: RecordingParams,
        statistics: &RunStatistics,
        registry: &mut RandomRegistry<StdRng>,
    ) -> Result<(), CommandError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_iterations_at_init
            .store(statistics.iterations_run(), Ordering::SeqCst);
        registry.register("u", StdRng::seed_from_u64(parameters.seed))?;
        Ok(())
    }

    fn simulate(&self, registry: &mut RandomRegistry<StdRng>) -> Result<(), CommandError> {
        let call = self.calls.load(Ordering::SeqCst) + 1;
        if self.fail_at_call == Some(call) {
            return Err(format!("trial {call} failed").into());
        }

        let rng = registry.get_random("u")?.ok_or("generator u missing")?;
        let draw: f64 = rng.random();
        *self.last_draw.lock().unwrap() = Some(draw);
        self.calls.store(call, Ordering::SeqCst);

        if let Some(gate) = &self.gate
            && gate.at_call == call
        {
            gate.reached.send(())?;
            gate.resume.lock().unwrap().recv()?;
        }
        Ok(())
    }

    fn result(&self) -> u64 {
        self.calls()
    }
}
