//! Named random generator storage with a one-way open/sealed lifecycle.
//!
//! A command registers the generators it needs while the registry is
//! [`RegistryState::Open`]. The solver seals the registry before the first
//! trial runs; from then on the set of names is fixed and generators can only
//! be looked up.

use rand::SeedableRng;
use rustc_hash::FxHashMap;

use crate::error::RegistryError;

/// Lifecycle state of a [`RandomRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryState {
    /// Generators may be registered and deregistered, lookups fail
    #[default]
    Open,
    /// Generators may be looked up, the name set is frozen
    Sealed,
}

/// Name-indexed collection of random generators
#[derive(Debug)]
pub struct RandomRegistry<R> {
    generators: FxHashMap<String, R>,
    state: RegistryState,
}

impl<R> RandomRegistry<R> {
    /// Create an empty, open registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            generators: FxHashMap::default(),
            state: RegistryState::Open,
        }
    }

    /// Insert a generator, replacing any previous one under the same name
    pub fn register(&mut self, name: impl Into<String>, generator: R) -> Result<(), RegistryError> {
        self.ensure_open()?;
        let name = name.into();
        tracing::trace!(name = %name, "Registering random generator");
        self.generators.insert(name, generator);
        Ok(())
    }

    /// Register a generator seeded deterministically from `seed`
    pub fn register_seeded(
        &mut self,
        name: impl Into<String>,
        seed: u64,
    ) -> Result<(), RegistryError>
    where
        R: SeedableRng,
    {
        self.register(name, R::seed_from_u64(seed))
    }

    /// Remove and return the generator stored under `name`
    pub fn deregister(&mut self, name: &str) -> Result<Option<R>, RegistryError> {
        self.ensure_open()?;
        Ok(self.generators.remove(name))
    }

    /// Look up the generator stored under `name`.
    ///
    /// Returns `Ok(None)` when no generator has that name. Fails with
    /// [`RegistryError::NotInitialized`] until the registry is sealed.
    pub fn get_random(&mut self, name: &str) -> Result<Option<&mut R>, RegistryError> {
        if self.state == RegistryState::Open {
            return Err(RegistryError::NotInitialized);
        }
        Ok(self.generators.get_mut(name))
    }

    /// Freeze the set of generators. Sealing twice is a no-op.
    pub fn seal(&mut self) {
        if self.state == RegistryState::Open {
            tracing::debug!(generators = self.generators.len(), "Sealing random registry");
            self.state = RegistryState::Sealed;
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_sealed(&self) -> bool {
        self.state == RegistryState::Sealed
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered generator names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    fn ensure_open(&self) -> Result<(), RegistryError> {
        match self.state {
            RegistryState::Open => Ok(()),
            RegistryState::Sealed => Err(RegistryError::AlreadyInitialized),
        }
    }
}

impl<R> Default for RandomRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
