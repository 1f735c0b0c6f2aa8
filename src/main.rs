// src/main.rs
use anyhow::Result;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use cluster_ping::{
    config,
    health::{status_sink, HealthChecker},
    transport::MongoTransport,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cluster_ping=info".parse()?)
                .add_directive("mongodb=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cluster-ping.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let transport = Arc::new(MongoTransport::from_config(&config.check));
    let sink = status_sink(config.check.sink);
    let checker = HealthChecker::new(transport, sink, config.check.timeout());

    let result = checker.check(&config.target).await;
    Ok(ExitCode::from(result.exit_code()))
}
