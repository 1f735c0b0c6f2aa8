// src/config/models.rs
use anyhow::{bail, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: ConnectionTarget,
    #[serde(default)]
    pub check: CheckConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.target.validate()?;
        self.check.validate()?;
        Ok(())
    }
}

/// Where to connect and how to authenticate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionTarget {
    pub hosts: Vec<String>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub tls: bool,
    /// Resolve the single host through DNS SRV records (`mongodb+srv://`).
    #[serde(default)]
    pub srv: bool,
    #[serde(default)]
    pub replica_set: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
    /// Stable server API version to declare, e.g. "1".
    #[serde(default)]
    pub server_api: Option<String>,
    #[serde(default)]
    pub auth_source: Option<String>,
}

impl ConnectionTarget {
    pub fn new<I, S>(hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            credentials: None,
            tls: false,
            srv: false,
            replica_set: None,
            app_name: None,
            server_api: None,
            auth_source: None,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            bail!("target must list at least one host");
        }
        if self.hosts.iter().any(|h| h.trim().is_empty()) {
            bail!("target host entries must not be blank");
        }
        if let Some(index) = self.hosts.iter().position(|h| !is_plain_host(h)) {
            // The entry may hold userinfo, so it is not echoed back.
            bail!(
                "target host entry {} must be a bare host[:port] without userinfo, path, query or separators",
                index
            );
        }
        if self.srv && self.hosts.len() != 1 {
            bail!(
                "SRV addressing takes exactly one host, got {}",
                self.hosts.len()
            );
        }
        if let Some(credentials) = &self.credentials {
            if credentials.username.is_empty() || credentials.password.is_empty() {
                bail!("credentials need both a username and a password");
            }
        }
        if let Some(version) = &self.server_api {
            if version != "1" {
                bail!("unsupported server API version: {}", version);
            }
        }
        Ok(())
    }
}

/// Userinfo, paths, query strings and list separators would let a host entry
/// rewrite the connection URI.
fn is_plain_host(host: &str) -> bool {
    !host
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '@' | '/' | '?' | '#' | ','))
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.srv { "mongodb+srv" } else { "mongodb" };
        write!(f, "{}://{}", scheme, self.hosts.join(","))
    }
}

#[derive(Clone, PartialEq, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Upper bound for `timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Where the human-readable status line goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSink {
    #[default]
    Stdout,
    Tracing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_driver_timeout_secs")]
    pub server_selection_timeout_secs: u64,
    #[serde(default = "default_driver_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub sink: OutputSink,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_driver_timeout_secs() -> u64 {
    5
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            server_selection_timeout_secs: default_driver_timeout_secs(),
            connect_timeout_secs: default_driver_timeout_secs(),
            sink: OutputSink::default(),
        }
    }
}

impl CheckConfig {
    /// Overall deadline for acquiring a connection and pinging it.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0
            || self.server_selection_timeout_secs == 0
            || self.connect_timeout_secs == 0
        {
            bail!("check timeouts must be greater than zero");
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            bail!(
                "timeout_secs must be at most {}, got {}",
                MAX_TIMEOUT_SECS,
                self.timeout_secs
            );
        }
        if self.server_selection_timeout_secs > self.timeout_secs
            || self.connect_timeout_secs > self.timeout_secs
        {
            bail!(
                "driver timeouts must not exceed the overall timeout of {}s",
                self.timeout_secs
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_host_list_rejected() {
        let hosts: Vec<String> = Vec::new();
        assert!(ConnectionTarget::new(hosts).is_err());
        assert!(ConnectionTarget::new(["db1:27017", "  "]).is_err());
    }

    #[test]
    fn test_srv_requires_single_host() {
        let mut target = ConnectionTarget::new(["a.example.net", "b.example.net"]).unwrap();
        target.srv = true;
        assert!(target.validate().is_err());

        target.hosts.truncate(1);
        assert!(target.validate().is_ok());
        assert_eq!(target.to_string(), "mongodb+srv://a.example.net");
    }

    #[test]
    fn test_display_and_debug_hide_password() {
        let target = ConnectionTarget::new(["db1:27017", "db2:27017"])
            .unwrap()
            .with_credentials(Credentials::new("app", "hunter2"));

        assert_eq!(target.to_string(), "mongodb://db1:27017,db2:27017");
        let debug = format!("{:?}", target);
        assert!(debug.contains("app"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_check_config_bounds() {
        assert!(CheckConfig::default().validate().is_ok());

        let zero = CheckConfig {
            timeout_secs: 0,
            ..CheckConfig::default()
        };
        assert!(zero.validate().is_err());

        let too_long = CheckConfig {
            timeout_secs: 3,
            server_selection_timeout_secs: 5,
            connect_timeout_secs: 1,
            ..CheckConfig::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_overall_timeout_has_ceiling() {
        let at_ceiling = CheckConfig {
            timeout_secs: MAX_TIMEOUT_SECS,
            ..CheckConfig::default()
        };
        assert!(at_ceiling.validate().is_ok());

        let huge = CheckConfig {
            timeout_secs: u64::MAX,
            ..CheckConfig::default()
        };
        let err = huge.validate().unwrap_err();
        assert!(err.to_string().contains("at most 3600"));
    }

    #[test]
    fn test_host_entries_cannot_rewrite_uri() {
        for host in [
            "admin:hunter2@db1:27017",
            "db1:27017/admin",
            "db1:27017?authSource=x",
            "db1:27017,db2:27017",
            "db1 :27017",
            "db1#frag",
        ] {
            let err = ConnectionTarget::new([host]).unwrap_err();
            assert!(!err.to_string().contains("hunter2"), "{}", err);
        }

        assert!(ConnectionTarget::new(["db1.example.net:27017", "[::1]:27017"]).is_ok());
    }
}
