//! Operational logging to a per-run file.
//!
//! Each process start creates a fresh, timestamp-named log file under
//! the configured directory. Every handled error logs its message and
//! underlying cause there; the HTTP caller only ever sees generic
//! categories.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the `tracing` subscriber writing to a file named by
/// process-start time. Returns the file's path.
pub fn init(log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let path = log_dir.join(file_name(Utc::now()));
    let file = File::create(&path)
        .with_context(|| format!("creating log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("auction_scout=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(path)
}

fn file_name(start: DateTime<Utc>) -> String {
    format!("auction-scout-{}.log", start.format("%Y%m%d-%H%M%S"))
}
