//! Logging setup
//!
//! Diagnostics go through `tracing`; stdout is reserved for JSON output, so
//! the subscriber writes to the `--log` target (standard error by default).

use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storadm_core::{ConnectionConfig, LogLevel};

/// Log target meaning "the process's standard error"
pub const STDERR_TARGET: &str = "/dev/stderr";

/// Install the global subscriber for this invocation
///
/// `RUST_LOG`, when set, takes precedence over `--log-level`.
pub fn init(config: &ConnectionConfig) -> anyhow::Result<()> {
    let target = config.log_target();
    let (writer, ansi) = make_writer(target)
        .with_context(|| format!("Failed to open log file {}", target.display()))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter_directive(
            config.log_level(),
        )))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::debug!(
        log_target = %target.display(),
        log_level = %config.log_level(),
        "Logging initialized"
    );
    Ok(())
}

fn filter_directive(level: LogLevel) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| level.as_directive().to_string())
}

/// Writer for a log target, and whether it may use ANSI colours
///
/// Colours are only used on an interactive stderr, never in files or pipes.
fn make_writer(target: &Path) -> std::io::Result<(BoxMakeWriter, bool)> {
    if target == Path::new(STDERR_TARGET) {
        let ansi = std::io::stderr().is_terminal();
        return Ok((BoxMakeWriter::new(std::io::stderr), ansi));
    }

    let file: File = OpenOptions::new().create(true).append(true).open(target)?;
    Ok((BoxMakeWriter::new(Mutex::new(file)), false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_colours_follow_terminal() {
        let (_, ansi) = make_writer(Path::new(STDERR_TARGET)).unwrap();
        assert_eq!(ansi, std::io::stderr().is_terminal());
    }

    #[test]
    fn test_file_target_is_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storadm.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let (_, ansi) = make_writer(&path).unwrap();
        assert!(!ansi);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\n");
    }

    #[test]
    fn test_unwritable_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("storadm.log");
        assert!(make_writer(&path).is_err());
    }
}
