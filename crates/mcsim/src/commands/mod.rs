//! Sample trial strategies runnable from the CLI.

mod dice;
mod pi;
mod running;

pub use dice::{DiceParams, DiceResult, DiceRoll};
pub use pi::{PiEstimate, PiResult};
pub use running::RunningMean;

use mcsim_core::{RandomRegistry, RegistryError};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Register `name` seeded from `seed`, or from the OS when no seed is given
pub(crate) fn register_generator(
    registry: &mut RandomRegistry<StdRng>,
    name: &str,
    seed: Option<u64>,
) -> Result<(), RegistryError> {
    match seed {
        Some(seed) => registry.register_seeded(name, seed),
        None => registry.register(name, StdRng::from_os_rng()),
    }
}
