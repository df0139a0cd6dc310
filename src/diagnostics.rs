//! Human-readable diagnostic output
//!
//! Request URLs, request bodies and raw responses are written to an injected
//! sink instead of straight to the console. The CLI picks the sink; library
//! code never decides where diagnostics end up.

use std::io::Write;
use tracing::debug;

/// Receives diagnostic text produced during an exchange
pub trait DiagnosticSink: Send + Sync {
    fn write_diagnostic(&self, text: &str);
}

/// Forwards diagnostics to `tracing` at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write_diagnostic(&self, text: &str) {
        debug!(target: "flightdesk::diagnostics", "{}", text);
    }
}

/// Writes diagnostics to stderr, one line per call
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn write_diagnostic(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        // A closed stderr is not worth failing an exchange over.
        let _ = writeln!(stderr, "{}", text);
    }
}

/// Discards all diagnostics
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl DiagnosticSink for NoOpSink {
    fn write_diagnostic(&self, _text: &str) {}
}
