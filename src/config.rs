use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

/// Hub configuration file
///
/// Every section is optional; a missing file section falls back to the
/// values the production site runs with.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub api: ApiSettings,
}

/// Status monitor settings
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_host")]
    pub host: String,

    #[serde(default = "default_probe_port")]
    pub port: u16,

    /// Seconds to sleep between probes
    #[serde(default = "default_probe_interval")]
    pub interval: u64,

    /// Seconds to wait for the first line after the greeting
    #[serde(default = "default_probe_timeout")]
    pub timeout: u64,

    /// Seconds after which an answer counts as slow (defaults to `timeout`)
    pub slow_after: Option<u64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: default_probe_host(),
            port: default_probe_port(),
            interval: default_probe_interval(),
            timeout: default_probe_timeout(),
            slow_after: None,
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn slow_after(&self) -> Duration {
        Duration::from_secs(self.slow_after.unwrap_or(self.timeout))
    }
}

/// Stats aggregator settings
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StatsConfig {
    /// Seconds to sleep between aggregations
    #[serde(default = "default_stats_interval")]
    pub interval: u64,

    /// How many hours back the dashboard reaches
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,

    /// Seconds for which the logged-in counter is considered current
    #[serde(default = "default_fresh_for")]
    pub fresh_for: u64,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval: default_stats_interval(),
            window_hours: default_window_hours(),
            fresh_for: default_fresh_for(),
            storage: StorageConfig::default(),
        }
    }
}

impl StatsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn fresh_for(&self) -> Duration {
        Duration::from_secs(self.fresh_for)
    }
}

/// Where stats are read from
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Empty in-memory source (dashboard stays empty)
    #[serde(rename = "none")]
    None,

    /// The SQLite stats database written by the messenger server
    Sqlite {
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

/// HTTP read surface settings
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiSettings {
    #[serde(default = "crate::util::get_default_bind")]
    pub bind: SocketAddr,

    /// Bearer token required on every request, if set
    pub auth_token: Option<String>,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bind: crate::util::get_default_bind(),
            auth_token: None,
            enable_cors: default_enable_cors(),
        }
    }
}

fn default_probe_host() -> String {
    String::from("m1.sxsurimessenger.ml")
}

fn default_probe_port() -> u16 {
    1863
}

fn default_probe_interval() -> u64 {
    120
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_stats_interval() -> u64 {
    300
}

fn default_window_hours() -> i64 {
    24
}

fn default_fresh_for() -> u64 {
    5 * 60
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("../server/stats.sqlite")
}

fn default_enable_cors() -> bool {
    true
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
