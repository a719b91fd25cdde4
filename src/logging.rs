use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Where log records go
pub enum LogTarget<'a> {
    Stderr,
    /// Append to a file; the terminal belongs to the TUI
    File(&'a Path),
}

/// Install the global logger. `RUST_LOG` wins over the default filter,
/// an explicit `level` wins over both.
pub fn init(level: Option<&str>, target: LogTarget) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }

    if let LogTarget::File(path) = target {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .context("Logger already initialized")?;
    Ok(())
}
