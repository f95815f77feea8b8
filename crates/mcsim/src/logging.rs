//! File logging for the CLI.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file name inside the data directory
pub const LOG_FILE_NAME: &str = "mcsim.log";

/// Size limits applied to the log file before it is opened
#[derive(Debug, Clone, Copy)]
pub struct RotationPolicy {
    /// Rotate once the file grows past this many bytes
    pub max_size: u64,
    /// Bytes of the most recent output kept after rotation
    pub keep_size: u64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: 5 * 1024 * 1024,
            keep_size: 1024 * 1024,
        }
    }
}

/// Trim `log_path` down to its most recent lines if it is over the limit.
///
/// Returns true if the file was rotated.
pub fn rotate_log_if_needed(log_path: &Path, policy: RotationPolicy) -> std::io::Result<bool> {
    if !log_path.exists() {
        return Ok(false);
    }

    let file_size = fs::metadata(log_path)?.len();
    if file_size <= policy.max_size {
        return Ok(false);
    }

    let mut tail = Vec::new();
    {
        let mut file = File::open(log_path)?;
        file.seek(SeekFrom::Start(file_size.saturating_sub(policy.keep_size)))?;
        file.read_to_end(&mut tail)?;
    }

    // Drop the partial first line
    let skip = tail
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- Log rotated (older entries removed) ---\n")?;
    file.write_all(&tail[skip..])?;
    Ok(true)
}

/// Hands out writers that share one open log file
#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

struct SharedFileGuard {
    file: Arc<Mutex<File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?;
        file.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: self.file.clone(),
        }
    }
}

/// Default filter directive when `RUST_LOG` is not set
pub fn default_filter(level: &str) -> String {
    format!("mcsim={level},mcsim_core=warn")
}

/// Initialize logging to `{data_dir}/mcsim.log`.
///
/// The level applies to the `mcsim` target; `RUST_LOG` overrides it entirely.
pub fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;

    let log_path = data_dir.join(LOG_FILE_NAME);
    if let Err(e) = rotate_log_if_needed(&log_path, RotationPolicy::default()) {
        eprintln!("Warning: Failed to rotate log file: {e}");
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let writer = SharedFileWriter {
        file: Arc::new(Mutex::new(file)),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true),
        )
        .init();

    tracing::info!(log_path = %log_path.display(), "mcsim logging initialized");
    Ok(log_path)
}
