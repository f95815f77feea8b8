use std::fmt;

/// Error type returned by [`Command`](crate::command::Command) implementations.
///
/// Boxed so trial strategies can fail with whatever error their domain
/// produces. A [`RegistryError`] converts into it with `?`.
pub type CommandError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors related to the random generator registry lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry has been sealed; generators can no longer be added or removed
    AlreadyInitialized,
    /// The registry is still open; lookups are not allowed until it is sealed
    NotInitialized,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyInitialized => {
                write!(f, "simulation already initialized, registry is sealed")
            }
            RegistryError::NotInitialized => {
                write!(f, "simulation not fully initialized, registry is still open")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Errors raised by the solver
#[derive(Debug)]
pub enum SolverError {
    /// `solve` was called after the solver was stopped
    Stopped,
    /// The command hit a registry lifecycle error during `init` or `simulate`
    Registry(RegistryError),
    /// The command failed during `init` or `simulate`
    Command(CommandError),
    /// The cumulative iteration count would overflow
    IterationOverflow { iterations_run: u64, requested: u64 },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Stopped => write!(f, "simulation has been stopped"),
            SolverError::Registry(e) => write!(f, "{e}"),
            SolverError::Command(e) => write!(f, "command failed: {e}"),
            SolverError::IterationOverflow {
                iterations_run,
                requested,
            } => write!(
                f,
                "iteration count overflow ({iterations_run} already run, {requested} requested)"
            ),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Registry(e) => Some(e),
            SolverError::Command(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<RegistryError> for SolverError {
    fn from(err: RegistryError) -> Self {
        SolverError::Registry(err)
    }
}

impl From<CommandError> for SolverError {
    /// Registry errors a command propagated with `?` keep their own variant
    fn from(err: CommandError) -> Self {
        match err.downcast::<RegistryError>() {
            Ok(registry) => SolverError::Registry(*registry),
            Err(other) => SolverError::Command(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_converts_into_command_error() {
        fn registry_lookup() -> std::result::Result<u32, RegistryError> {
            Err(RegistryError::NotInitialized)
        }

        fn lookup() -> std::result::Result<(), CommandError> {
            registry_lookup()?;
            Ok(())
        }

        let err = lookup().unwrap_err();
        assert_eq!(
            err.downcast_ref::<RegistryError>(),
            Some(&RegistryError::NotInitialized)
        );
    }

    #[test]
    fn test_solver_error_display() {
        assert_eq!(
            SolverError::Stopped.to_string(),
            "simulation has been stopped"
        );
        assert_eq!(
            SolverError::from(RegistryError::AlreadyInitialized).to_string(),
            "simulation already initialized, registry is sealed"
        );

        let err = SolverError::IterationOverflow {
            iterations_run: u64::MAX,
            requested: 1,
        };
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_command_error_recovers_registry_variant() {
        let boxed: CommandError = Box::new(RegistryError::AlreadyInitialized);
        assert!(matches!(
            SolverError::from(boxed),
            SolverError::Registry(RegistryError::AlreadyInitialized)
        ));

        let other: CommandError = "bad trial".into();
        assert!(matches!(SolverError::from(other), SolverError::Command(_)));
    }

    #[test]
    fn test_command_error_source() {
        use std::error::Error;

        let err = SolverError::Command("bad trial".into());
        assert_eq!(err.to_string(), "command failed: bad trial");
        assert!(err.source().is_some());
        assert!(SolverError::Stopped.source().is_none());
    }
}
