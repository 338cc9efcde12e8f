use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;

pub const LOG_FILE: &str = "script.log";

/// Sends all log output to `path`, appending. Only errors are recorded unless
/// `RUST_LOG` asks for more.
pub fn init(path: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path))?;

    Builder::from_env(Env::default().default_filter_or("error"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()?;

    Ok(())
}
