//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. Explicit path (e.g. `--config <path>`)
//! 2. `~/.hermod/config.toml` (user)
//! 3. `/etc/hermod/config.toml` (system)
//!
//! When no file exists the built-in defaults apply. Every field is optional.
//!
//! ```toml
//! [transport]
//! endpoint = "https://proxy.example.com/api"
//!
//! [limits]
//! max_requests_per_minute = 20
//!
//! [cache]
//! trending_ttl_secs = 600
//!
//! [retry]
//! max_attempts = 4
//! delays_ms = [500, 1000, 2000]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::ledger::LedgerConfig;
use crate::queue::{QueueConfig, RetryConfig};
use crate::{HermodError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub cache: CacheTtlConfig,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub ledger: LedgerSection,
    #[serde(default)]
    pub queue: QueueSection,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Upstream endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Endpoint URL (default: http://localhost:3000/api).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Admission limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Requests admitted per 60-second window (default: 10).
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,
    /// Estimated tokens per UTC day (default: 100000).
    #[serde(default = "default_max_daily_tokens")]
    pub max_daily_tokens: u64,
    /// Longest accepted input in characters (default: 1000).
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: default_max_requests_per_minute(),
            max_daily_tokens: default_max_daily_tokens(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

fn default_max_requests_per_minute() -> u32 {
    crate::governance::limiter::DEFAULT_MAX_PER_MINUTE
}

fn default_max_daily_tokens() -> u64 {
    crate::governance::budget::DEFAULT_DAILY_TOKENS
}

pub(crate) fn default_max_input_chars() -> usize {
    1000
}

/// Per-kind cache lifetimes, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheTtlConfig {
    #[serde(default = "default_translation_ttl")]
    pub translation_ttl_secs: u64,
    #[serde(default = "default_cultural_ttl")]
    pub cultural_ttl_secs: u64,
    #[serde(default = "default_trending_ttl")]
    pub trending_ttl_secs: u64,
    #[serde(default = "default_translation_ttl")]
    pub default_ttl_secs: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            translation_ttl_secs: default_translation_ttl(),
            cultural_ttl_secs: default_cultural_ttl(),
            trending_ttl_secs: default_trending_ttl(),
            default_ttl_secs: default_translation_ttl(),
        }
    }
}

fn default_translation_ttl() -> u64 {
    24 * 60 * 60
}

fn default_cultural_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_trending_ttl() -> u64 {
    60 * 60
}

/// Retry policy for transient transport errors.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Attempts including the first (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before each retry in milliseconds (default: [1000, 2000, 4000]).
    #[serde(default = "default_delays_ms")]
    pub delays_ms: Vec<u64>,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delays_ms: default_delays_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delays_ms() -> Vec<u64> {
    vec![1000, 2000, 4000]
}

/// Ledger retention.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSection {
    /// Records retained (default: 100).
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Records returned with stats (default: 10).
    #[serde(default = "default_recent_history")]
    pub recent_history: usize,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            recent_history: default_recent_history(),
        }
    }
}

fn default_max_history() -> usize {
    100
}

fn default_recent_history() -> usize {
    10
}

/// Queue pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSection {
    /// Pause after each settled request in milliseconds (default: 100).
    #[serde(default = "default_drain_pause_ms")]
    pub drain_pause_ms: u64,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            drain_pause_ms: default_drain_pause_ms(),
        }
    }
}

fn default_drain_pause_ms() -> u64 {
    100
}

/// Where governance state is persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// State file (default: `~/.hermod/state.json`).
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first existing file
    /// among the user and system locations is used, else the defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            HermodError::Configuration(format!("failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            HermodError::Configuration(msg) => {
                HermodError::Configuration(format!("{path:?}: {msg}"))
            }
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| HermodError::Configuration(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HermodError::Configuration(format!(
                "config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".hermod").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/hermod/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    fn validate(&self) -> Result<()> {
        if self.transport.endpoint.trim().is_empty() {
            return Err(HermodError::Configuration(
                "transport.endpoint must not be empty".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(HermodError::Configuration(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.limits.max_input_chars == 0 {
            return Err(HermodError::Configuration(
                "limits.max_input_chars must be at least 1".into(),
            ));
        }
        if self.ledger.recent_history > self.ledger.max_history {
            return Err(HermodError::Configuration(format!(
                "ledger.recent_history ({}) must not exceed ledger.max_history ({})",
                self.ledger.recent_history, self.ledger.max_history
            )));
        }
        let c = &self.cache;
        for (name, secs) in [
            ("translation_ttl_secs", c.translation_ttl_secs),
            ("cultural_ttl_secs", c.cultural_ttl_secs),
            ("trending_ttl_secs", c.trending_ttl_secs),
            ("default_ttl_secs", c.default_ttl_secs),
        ] {
            if secs == 0 {
                return Err(HermodError::Configuration(format!(
                    "cache.{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.transport.timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.retry.max_attempts)
            .delays(
                self.retry
                    .delays_ms
                    .iter()
                    .map(|ms| Duration::from_millis(*ms))
                    .collect::<Vec<_>>(),
            )
    }

    pub fn cache_config(&self) -> CacheConfig {
        let c = &self.cache;
        CacheConfig::new()
            .translation_ttl(Duration::from_secs(c.translation_ttl_secs))
            .cultural_ttl(Duration::from_secs(c.cultural_ttl_secs))
            .trending_ttl(Duration::from_secs(c.trending_ttl_secs))
            .default_ttl(Duration::from_secs(c.default_ttl_secs))
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new()
            .max_history(self.ledger.max_history)
            .recent_history(self.ledger.recent_history)
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::new()
            .retry(self.retry_config())
            .drain_pause(Duration::from_millis(self.queue.drain_pause_ms))
    }

    /// Configured state file, else `~/.hermod/state.json`.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.storage
            .state_path
            .clone()
            .or_else(crate::storage::JsonFileStore::default_path)
    }
}
