// src/health/sink.rs
use crate::config::OutputSink;
use chrono::{SecondsFormat, Utc};
use std::io::Write;
use std::sync::Arc;

/// Destination for human-readable status lines.
pub trait StatusSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes each line to stdout, prefixed with a UTC timestamp.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl StatusSink for StdoutSink {
    fn emit(&self, line: &str) {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "[{}] {}", stamp, line) {
            tracing::warn!("Failed to write status line: {}", e);
        }
    }
}

/// Routes status lines into the tracing pipeline instead of stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!(target: "cluster_ping::status", "{}", line);
    }
}

/// Build the sink selected by `check.sink`.
pub fn status_sink(kind: OutputSink) -> Arc<dyn StatusSink> {
    match kind {
        OutputSink::Stdout => Arc::new(StdoutSink),
        OutputSink::Tracing => Arc::new(TracingSink),
    }
}
