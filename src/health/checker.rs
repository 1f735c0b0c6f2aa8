// src/health/checker.rs
use super::sink::StatusSink;
use crate::config::ConnectionTarget;
use crate::transport::{Transport, TransportError};
use std::future::Future;
use std::sync::Arc;
use tokio::time::error::Elapsed;
use tokio::time::{timeout, timeout_at, Duration, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// One-shot connectivity probe: acquire, ping, release.
pub struct HealthChecker {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn StatusSink>,
    timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    Success { response_time_ms: u64 },
    Failure(TransportError),
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckResult::Success { .. })
    }

    /// Process exit indicator: 0 on success, 1 on failure.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl HealthChecker {
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn StatusSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            sink,
            timeout,
        }
    }

    pub async fn check(&self, target: &ConnectionTarget) -> CheckResult {
        let span = info_span!(
            "health_check",
            check_id = %Uuid::new_v4(),
            target = %target,
            transport = self.transport.name()
        );

        async {
            let start = Instant::now();
            let result = match self.probe(target).await {
                Ok(()) => CheckResult::Success {
                    response_time_ms: start.elapsed().as_millis() as u64,
                },
                Err(e) => CheckResult::Failure(e),
            };
            self.report(target, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn probe(&self, target: &ConnectionTarget) -> Result<(), TransportError> {
        // None when the timeout is too large to express as an instant.
        let deadline = Instant::now().checked_add(self.timeout);

        let mut connection = match self.within(deadline, self.transport.connect(target)).await {
            Ok(connection) => connection?,
            Err(_) => return Err(TransportError::Timeout(self.timeout)),
        };
        debug!("Connection acquired");

        let outcome = match self.within(deadline, connection.admin_ping()).await {
            Ok(Ok(response)) if response.ok => Ok(()),
            Ok(Ok(_)) => Err(TransportError::Protocol(
                "ping reply reported ok: 0".to_string(),
            )),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        };

        // Nothing between acquire and here returns early.
        match timeout(self.timeout, connection.close()).await {
            Ok(Ok(())) => debug!("Connection released"),
            Ok(Err(e)) => warn!("Failed to release connection: {}", e),
            Err(_) => warn!("Timed out releasing connection after {:?}", self.timeout),
        }

        outcome
    }

    async fn within<F: Future>(
        &self,
        deadline: Option<Instant>,
        fut: F,
    ) -> Result<F::Output, Elapsed> {
        match deadline {
            Some(deadline) => timeout_at(deadline, fut).await,
            None => timeout(self.timeout, fut).await,
        }
    }

    fn report(&self, target: &ConnectionTarget, result: &CheckResult) {
        match result {
            CheckResult::Success { response_time_ms } => {
                info!("Ping succeeded in {} ms", response_time_ms);
                self.sink.emit(&format!(
                    "Pinged {}: deployment reachable ({} ms)",
                    target, response_time_ms
                ));
            }
            CheckResult::Failure(e) => {
                warn!(kind = e.kind(), "Ping failed: {}", e);
                self.sink.emit(&format!(
                    "Ping to {} failed [{}]: {}",
                    target,
                    e.kind(),
                    e
                ));
            }
        }
    }
}
