// src/health/mod.rs
mod checker;
mod sink;

pub use checker::{CheckResult, HealthChecker};
pub use sink::{status_sink, StatusSink, StdoutSink, TracingSink};
