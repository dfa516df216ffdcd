use crate::entity::DEFAULT_SEED_SIZE;
use crate::error::{Result, TurnoverError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_REMOTE_URL: &str = "SUPABASE_URL";
pub const ENV_REMOTE_KEY: &str = "SUPABASE_ANON_KEY";

// ---------------------------------------------------------------------------
// SyncSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Quiet period before queued edits are pushed to the remote store.
    #[serde(default = "default_push_debounce_ms")]
    pub push_debounce_ms: u64,
    /// How long startup waits for the remote client before going local-only.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    /// Period of the status re-evaluation sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_seed_size")]
    pub seed_size: usize,
    #[serde(default = "default_cache_key")]
    pub cache_key: String,
}

fn default_push_debounce_ms() -> u64 {
    400
}

fn default_ready_timeout_ms() -> u64 {
    4000
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_seed_size() -> usize {
    DEFAULT_SEED_SIZE
}

fn default_cache_key() -> String {
    paths::ROSTER_KEY.to_string()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            push_debounce_ms: default_push_debounce_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
            seed_size: default_seed_size(),
            cache_key: default_cache_key(),
        }
    }
}

impl SyncSettings {
    pub fn push_debounce(&self) -> Duration {
        Duration::from_millis(self.push_debounce_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// RemoteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    paths::REMOTE_TABLE.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: default_table(),
        }
    }
}

impl RemoteConfig {
    /// Both the URL and the key are required; otherwise the app runs
    /// local-only.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Config {
    /// Load `.turnover/config.yaml`; a missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        let cfg = match crate::io::read_optional(&path)? {
            Some(data) => serde_yaml::from_str(&data)?,
            None => Config::default(),
        };
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Overlay the remote credentials from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|k| std::env::var(k).ok())
    }

    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_REMOTE_URL).filter(|v| !v.is_empty()) {
            self.remote.url = url;
        }
        if let Some(key) = lookup(ENV_REMOTE_KEY).filter(|v| !v.is_empty()) {
            self.remote.anon_key = key;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.sweep_interval_secs == 0 {
            return Err(TurnoverError::Config(
                "sync.sweep_interval_secs must be greater than zero".into(),
            ));
        }
        if self.sync.cache_key.trim().is_empty() {
            return Err(TurnoverError::Config("sync.cache_key must not be empty".into()));
        }
        if self.remote.table.trim().is_empty() {
            return Err(TurnoverError::Config("remote.table must not be empty".into()));
        }
        if self.remote.is_configured()
            && !(self.remote.url.starts_with("http://") || self.remote.url.starts_with("https://"))
        {
            return Err(TurnoverError::Config(format!(
                "remote.url must be an http(s) URL, got '{}'",
                self.remote.url
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
