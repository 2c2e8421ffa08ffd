use serde::Deserialize;
use std::num::NonZeroU32;

use crate::controller::WritePolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub counter: CounterConfig,
}

/// Where the dashboard's own HTTP/WebSocket surface listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base endpoint of the anomaly-detection service, e.g. "http://127.0.0.1:5000".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub interval_ms: u64,
    /// How overlapping refreshes resolve writes to the same field.
    #[serde(default)]
    pub write_policy: WritePolicy,
}

fn default_refresh_interval_ms() -> u64 {
    30_000
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_refresh_interval_ms(),
            write_policy: WritePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionsConfig {
    /// Batches requested by the "collect" action.
    #[serde(default = "default_num_collections")]
    pub num_collections: u32,
}

fn default_num_collections() -> u32 {
    5
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            num_collections: default_num_collections(),
        }
    }
}

impl ActionsConfig {
    /// Validated value; `validate` rejects 0, so the fallback is never hit after loading.
    pub fn num_collections(&self) -> NonZeroU32 {
        NonZeroU32::new(self.num_collections).unwrap_or(NonZeroU32::MIN)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_tick_ms")]
    pub tick_ms: u64,
}

fn default_counter_tick_ms() -> u64 {
    30
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_counter_tick_ms(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.remote.base_url.starts_with("http://")
                || self.remote.base_url.starts_with("https://"),
            "remote.base_url must start with http:// or https://, got {:?}",
            self.remote.base_url
        );
        anyhow::ensure!(
            self.remote.request_timeout_ms > 0,
            "remote.request_timeout_ms must be > 0, got {}",
            self.remote.request_timeout_ms
        );
        anyhow::ensure!(
            self.refresh.interval_ms > 0,
            "refresh.interval_ms must be > 0, got {}",
            self.refresh.interval_ms
        );
        anyhow::ensure!(
            self.actions.num_collections > 0,
            "actions.num_collections must be > 0, got {}",
            self.actions.num_collections
        );
        anyhow::ensure!(
            self.counter.tick_ms > 0,
            "counter.tick_ms must be > 0, got {}",
            self.counter.tick_ms
        );
        Ok(())
    }
}
