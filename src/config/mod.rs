// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

pub const ENV_HOSTS: &str = "CLUSTER_PING_HOSTS";
pub const ENV_USERNAME: &str = "CLUSTER_PING_USERNAME";
pub const ENV_PASSWORD: &str = "CLUSTER_PING_PASSWORD";

/// Load configuration from a file (YAML or JSON), then apply environment overrides
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let mut config = parse_config(path, &contents)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(contents).context("Failed to parse JSON config")?,
    };
    Ok(config)
}

/// Overlay host and credential values taken from `lookup` (the process
/// environment in production). Empty values are ignored.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(hosts) = lookup(ENV_HOSTS) {
        config.target.hosts = hosts
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        tracing::debug!("Hosts overridden from {}", ENV_HOSTS);
    }

    let username = lookup(ENV_USERNAME);
    let password = lookup(ENV_PASSWORD);
    if username.is_none() && password.is_none() {
        return;
    }

    let credentials = config
        .target
        .credentials
        .get_or_insert_with(|| Credentials::new("", ""));
    if let Some(username) = username {
        credentials.username = username;
    }
    if let Some(password) = password {
        credentials.password = password;
    }
    tracing::debug!("Credentials overridden from environment");
}
