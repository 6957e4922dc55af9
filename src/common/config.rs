//! Configuration for volagent
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `VOLAGENT_*` environment variables. The binary applies
//! CLI flags on top.

use crate::common::utils::parse_duration;
use crate::common::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "volagent.toml";

/// 10 GiB
pub const DEFAULT_VOLUME_SIZE: u64 = 10 * 1024 * 1024 * 1024;

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Cluster metadata service base URL
    pub metadata_url: String,

    /// Controller control API, as seen from the controller role
    pub controller_url: String,

    /// Controller control API, as seen from a replica sidecar
    pub controller_status_url: String,

    /// Local replica control API
    pub replica_url: String,

    /// Metadata service name of the replica role
    pub replica_service: String,

    /// Replica control API port
    pub replica_port: u16,

    /// Volume name on the controller API
    pub volume_name: String,

    /// Bind address for the status endpoints
    pub listen: SocketAddr,

    /// Logging level
    pub log_level: String,

    /// Pause between reconciliation passes
    pub sync_interval: String,

    /// Pause between discovery attempts while waiting for enough replicas at startup
    pub startup_poll_interval: String,

    /// Wait budget for a replica to reach the open state
    pub open_timeout: String,

    /// Retry interval while the metadata service is unreachable
    pub metadata_wait_interval: String,

    /// Request timeout for every control API call
    pub http_timeout: String,

    /// Volume size in bytes when the metadata service does not provide one
    pub default_volume_size: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            metadata_url: "http://rancher-metadata/2015-12-19".to_string(),
            controller_url: "http://localhost:9501".to_string(),
            controller_status_url: "http://controller:9501".to_string(),
            replica_url: "http://localhost:9502".to_string(),
            replica_service: "replica".to_string(),
            replica_port: 9502,
            volume_name: "volume".to_string(),
            listen: SocketAddr::from(([0, 0, 0, 0], 8199)),
            log_level: "debug".to_string(),
            sync_interval: "5s".to_string(),
            startup_poll_interval: "1s".to_string(),
            open_timeout: "10s".to_string(),
            metadata_wait_interval: "1s".to_string(),
            http_timeout: "10s".to_string(),
            default_volume_size: DEFAULT_VOLUME_SIZE,
        }
    }
}

impl AgentConfig {
    /// Load config from `path` (or `volagent.toml` if present) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&AgentConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let conf: AgentConfig = builder
            .add_source(config::Environment::with_prefix("VOLAGENT"))
            .build()?
            .try_deserialize()?;
        conf.validate()?;
        Ok(conf)
    }

    /// Reject unparsable durations up front rather than mid-run
    pub fn validate(&self) -> Result<()> {
        self.timings()?;
        self.http_timeout()?;
        self.metadata_wait_interval()?;
        if self.replica_service.is_empty() {
            return Err(crate::Error::InvalidConfig("replica_service cannot be empty".into()));
        }
        Ok(())
    }

    pub fn timings(&self) -> Result<Timings> {
        Ok(Timings {
            sync_interval: parse_duration(&self.sync_interval)?,
            startup_poll_interval: parse_duration(&self.startup_poll_interval)?,
            open_timeout: parse_duration(&self.open_timeout)?,
        })
    }

    pub fn http_timeout(&self) -> Result<Duration> {
        parse_duration(&self.http_timeout)
    }

    pub fn metadata_wait_interval(&self) -> Result<Duration> {
        parse_duration(&self.metadata_wait_interval)
    }
}

/// Timing knobs of the membership core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub sync_interval: Duration,
    pub startup_poll_interval: Duration,
    pub open_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(5),
            startup_poll_interval: Duration::from_secs(1),
            open_timeout: Duration::from_secs(10),
        }
    }
}
