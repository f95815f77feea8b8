use std::path::PathBuf;

use clap::Parser;
use mcsim::{CommandKind, RunConfig, init_logging, run_configured};

#[derive(Parser, Debug)]
#[command(name = "mcsim")]
#[command(about = "Run Monte Carlo simulations in resumable batches")]
struct Args {
    /// Path to a YAML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the data directory (default: ~/.mcsim/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Command to simulate (overrides the config file)
    #[arg(long, value_enum)]
    command: Option<CommandKind>,

    /// Total iterations to run
    #[arg(short, long)]
    iterations: Option<u64>,

    /// Iterations per solve call
    #[arg(short, long)]
    batch_size: Option<u64>,

    /// Seed for the command's generators
    #[arg(short, long)]
    seed: Option<u64>,

    /// Continue counting from a previous run's iteration count
    #[arg(long)]
    resume_from: Option<u64>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,

    /// Do not print progress lines
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn run_config(&self) -> color_eyre::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        if let Some(command) = self.command {
            config.command = command;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.resume_from.is_some() {
            config.resume_from = self.resume_from;
        }

        config.validate()?;
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mcsim")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
    init_logging(&data_dir, &args.log_level)?;

    let config = args.run_config()?;
    tracing::info!(
        command = %config.command,
        iterations = config.iterations,
        batch_size = config.batch_size,
        seed = ?config.seed,
        "Run configured"
    );

    let quiet = args.quiet;
    let summary = run_configured(&config, |completed, total, result| {
        if !quiet {
            let pct = if total == 0 {
                100.0
            } else {
                completed as f64 / total as f64 * 100.0
            };
            println!("[{pct:5.1}%] {completed}/{total} {result}");
        }
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }

    tracing::info!(cancelled = summary.cancelled(), "mcsim shutting down");
    Ok(())
}
