//! Console diagnostic channel

use std::io::Write;

use crate::core::platform::DiagnosticSink;

/// Writes diagnostic lines to stdout, CRLF-terminated like the device UART
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Create a console sink
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for ConsoleSink {
    fn emit(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = write!(stdout, "{}\r\n", line.trim_end_matches(['\r', '\n'])) {
            tracing::debug!("Dropped diagnostic line: {e}");
        }
    }
}
