use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Returns `<data_local_dir>/timeclock/timeclock.log`.
pub fn log_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("timeclock").join("timeclock.log"),
        None => PathBuf::from("timeclock.log"),
    }
}

/// Installs a file subscriber. The terminal belongs to the TUI, so nothing is
/// written to stdout. `RUST_LOG` wins over `default_level`.
pub fn init(default_level: &str) -> Result<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing log subscriber: {err}"))?;
    Ok(path)
}
