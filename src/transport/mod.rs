// src/transport/mod.rs
mod mongo;

pub use mongo::{MongoConnection, MongoTransport};

use crate::config::ConnectionTarget;
use async_trait::async_trait;
use std::time::Duration;

/// Opens connections to a target. The wire protocol lives behind this seam.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(
        &self,
        target: &ConnectionTarget,
    ) -> Result<Box<dyn Connection>, TransportError>;

    fn name(&self) -> &'static str;
}

/// A connection exclusively owned by one health check.
#[async_trait]
pub trait Connection: Send {
    /// Send the administrative liveness request and wait for its reply.
    async fn admin_ping(&mut self) -> Result<PingResponse, TransportError>;

    /// Release the connection. Called at most once.
    async fn close(&mut self) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PingResponse {
    /// Whether the server reported `ok: 1`.
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl TransportError {
    /// Short classification label used in status lines and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Network(_) => "NetworkError",
            TransportError::Authentication(_) => "AuthenticationError",
            TransportError::Timeout(_) => "Timeout",
            TransportError::Protocol(_) => "ProtocolError",
            TransportError::Unknown(_) => "UnknownError",
        }
    }
}
