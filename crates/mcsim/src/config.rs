//! Run configuration loaded from YAML
//!
//! ```yaml
//! command: dice
//! iterations: 250000
//! batch_size: 1000
//! seed: 42
//! dice:
//!   sides: 6
//!   count: 2
//! resume_from: 10000
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::worker::DEFAULT_BATCH_SIZE;

fn default_iterations() -> u64 {
    100_000
}

fn default_batch_size() -> u64 {
    DEFAULT_BATCH_SIZE
}

/// Which sample command to run
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Estimate pi from points in the unit square
    #[default]
    Pi,
    /// Average the total of a set of dice
    Dice,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Pi => write!(f, "pi"),
            CommandKind::Dice => write!(f, "dice"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceConfig {
    pub sides: u32,
    pub count: u32,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self { sides: 6, count: 1 }
    }
}

/// Complete configuration for one CLI run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub command: CommandKind,
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Iterations handed to each `solve` call
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Seed for the command's generators (None = seeded from entropy)
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub dice: DiceConfig,
    /// Iteration count of a previous run to continue from
    #[serde(default)]
    pub resume_from: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            command: CommandKind::default(),
            iterations: default_iterations(),
            batch_size: default_batch_size(),
            seed: None,
            dice: DiceConfig::default(),
            resume_from: None,
        }
    }
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_saphyr::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject settings the worker or the commands cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.command == CommandKind::Dice {
            if self.dice.sides < 2 {
                return Err(ConfigError::Invalid("dice.sides must be at least 2".into()));
            }
            if self.dice.count == 0 {
                return Err(ConfigError::Invalid("dice.count must be at least 1".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_saphyr::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_saphyr::Error> for ConfigError {
    fn from(err: serde_saphyr::Error) -> Self {
        ConfigError::Parse(err)
    }
}
