// src/lib.rs
pub mod config;
pub mod health;
pub mod transport;

pub use config::{CheckConfig, Config, ConnectionTarget, Credentials};
pub use health::{CheckResult, HealthChecker, StatusSink};
pub use transport::{Connection, PingResponse, Transport, TransportError};
