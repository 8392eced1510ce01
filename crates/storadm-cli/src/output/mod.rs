//! Output formatting for the CLI
//!
//! Every payload, successful or not, is printed the same way: JSON with
//! four-space indentation on stdout. Object keys come out in a stable order
//! (struct declaration order, sorted for maps). Success and failure are
//! distinguished only by the process exit status.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use storadm_core::{BackendStatus, ClusterError};

/// Error code used for failures that did not come from the cluster
pub const INTERNAL_ERROR_CODE: i32 = -1;

/// Result of every backend action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendsReport {
    pub backends: Vec<BackendStatus>,
}

/// Result of every monitor action: node address to statistics document
pub type StatsReport = BTreeMap<String, serde_json::Value>;

/// Payload produced by a successful command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Backends(BackendsReport),
    Stats(StatsReport),
}

/// Canonical failure description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: i32,
    pub message: String,
}

impl ErrorReport {
    /// Report for a failure outside the cluster (logging setup, output)
    pub fn internal(err: impl fmt::Display) -> Self {
        Self {
            code: INTERNAL_ERROR_CODE,
            message: err.to_string(),
        }
    }

    /// Wrap into the `{"error": {...}}` envelope
    pub fn into_envelope(self) -> ErrorEnvelope {
        ErrorEnvelope { error: self }
    }
}

impl From<&ClusterError> for ErrorReport {
    fn from(err: &ClusterError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
        }
    }
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorReport,
}

/// Render a value as indented JSON
pub fn render_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes JSON payloads to a sink (stdout in the binary)
pub struct Printer<W: Write = Box<dyn Write>> {
    out: W,
}

impl Printer<Box<dyn Write>> {
    /// Create a printer writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl<W: Write> Printer<W> {
    /// Create a printer with a custom writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print one payload followed by a newline
    pub fn print<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        let json = render_json(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.out, "{}", json)?;
        self.out.flush()
    }

    /// Print an error envelope
    pub fn print_error(&mut self, report: ErrorReport) -> std::io::Result<()> {
        self.print(&report.into_envelope())
    }
}

impl<W: Write> fmt::Debug for Printer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer").finish_non_exhaustive()
    }
}
