//! Time-bounded result cache.
//!
//! [`ResultCache`] maps a [`Fingerprint`] to the upstream result body of a
//! successful governed request. Each [`OperationKind`] has its own TTL:
//! translations live for a day, cultural explanations for a week, trending
//! topics for an hour.
//!
//! # Expiry
//!
//! Entries are backed by moka with a per-entry [`Expiry`] policy keyed on
//! the fingerprint's kind. An expired entry is invisible to [`get`] the
//! moment its TTL passes and is physically removed by moka's maintenance,
//! which runs on reads and writes and on every tick of the background
//! sweeper ([`ResultCache::spawn_sweeper`]). Overwriting with [`set`]
//! restarts the entry's TTL.
//!
//! There is no size bound or LRU policy; only TTL limits memory.
//!
//! # Clock
//!
//! TTLs are measured on moka's own monotonic clock, not on the gateway's
//! injected [`Clock`](crate::clock::Clock). Advancing a manual clock does not
//! expire cache entries, so cache expiry tests use short real TTLs.
//!
//! [`get`]: ResultCache::get
//! [`set`]: ResultCache::set

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use super::Fingerprint;
use crate::telemetry;
use crate::types::OperationKind;

/// Shortest sweep interval, used when every TTL is zero.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Per-kind time-to-live configuration.
///
/// ```rust
/// # use hermod::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .translation_ttl(Duration::from_secs(3600))
///     .trending_ttl(Duration::from_secs(600));
/// assert_eq!(config.max_ttl(), CacheConfig::default().cultural_ttl);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Translations. Default: 24 hours.
    pub translation_ttl: Duration,
    /// Cultural explanations. Default: 7 days.
    pub cultural_ttl: Duration,
    /// Trending topics. Default: 1 hour.
    pub trending_ttl: Duration,
    /// Every other kind (compliance, reply suggestions, title analysis).
    /// Default: 24 hours.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            translation_ttl: Duration::from_secs(24 * 3600),
            cultural_ttl: Duration::from_secs(7 * 24 * 3600),
            trending_ttl: Duration::from_secs(3600),
            default_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same TTL for every kind.
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            translation_ttl: ttl,
            cultural_ttl: ttl,
            trending_ttl: ttl,
            default_ttl: ttl,
        }
    }

    pub fn translation_ttl(mut self, ttl: Duration) -> Self {
        self.translation_ttl = ttl;
        self
    }

    pub fn cultural_ttl(mut self, ttl: Duration) -> Self {
        self.cultural_ttl = ttl;
        self
    }

    pub fn trending_ttl(mut self, ttl: Duration) -> Self {
        self.trending_ttl = ttl;
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// TTL applied to entries of `kind`.
    pub fn ttl_for(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Translation => self.translation_ttl,
            OperationKind::CulturalExplanation => self.cultural_ttl,
            OperationKind::TrendingTopics => self.trending_ttl,
            OperationKind::Compliance
            | OperationKind::ReplySuggestion
            | OperationKind::TitleOptimization => self.default_ttl,
        }
    }

    /// Longest TTL in use. Also the sweep interval.
    pub fn max_ttl(&self) -> Duration {
        OperationKind::ALL
            .iter()
            .map(|k| self.ttl_for(*k))
            .max()
            .unwrap_or(self.default_ttl)
    }
}

struct KindExpiry {
    config: CacheConfig,
}

impl Expiry<Fingerprint, Value> for KindExpiry {
    fn expire_after_create(
        &self,
        key: &Fingerprint,
        _value: &Value,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.config.ttl_for(key.kind()))
    }

    fn expire_after_update(
        &self,
        key: &Fingerprint,
        _value: &Value,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // overwrite restarts the clock
        Some(self.config.ttl_for(key.kind()))
    }
}

/// In-memory result cache with per-kind TTL.
#[derive(Clone)]
pub struct ResultCache {
    cache: Cache<Fingerprint, Value>,
    sweep_interval: Duration,
}

impl ResultCache {
    /// Create a new result cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .expire_after(KindExpiry {
                config: config.clone(),
            })
            .build();
        Self {
            cache,
            // tokio intervals reject a zero period
            sweep_interval: config.max_ttl().max(MIN_SWEEP_INTERVAL),
        }
    }

    /// Look up a cached result.
    ///
    /// Returns `None` on miss or expiry. Emits cache hit/miss metrics.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<Value> {
        let kind = fingerprint.kind().stats_key();
        match self.cache.get(fingerprint).await {
            Some(v) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "kind" => kind).increment(1);
                Some(v)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "kind" => kind).increment(1);
                None
            }
        }
    }

    /// Insert or overwrite a result, restarting its TTL.
    pub async fn set(&self, fingerprint: Fingerprint, value: Value) {
        self.cache.insert(fingerprint, value).await;
    }

    /// Remove every expired entry now.
    pub async fn sweep(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Interval the background sweeper runs at (the longest TTL).
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Start the background sweeper on the current tokio runtime.
    ///
    /// The first sweep happens one interval after the call. The task stops
    /// when the returned handle is cancelled or dropped.
    pub fn spawn_sweeper(&self) -> SweepHandle {
        let cache = self.cache.clone();
        let period = self.sweep_interval;
        let task = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                cache.run_pending_tasks().await;
                debug!(entries = cache.entry_count(), "result cache swept");
            }
        });
        SweepHandle { task: Some(task) }
    }
}

/// Cancellable handle to the background cache sweeper.
#[derive(Debug)]
pub struct SweepHandle {
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Stop the sweeper. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
