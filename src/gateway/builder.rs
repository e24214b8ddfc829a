//! Builder wiring the governance components together

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::GovernedGateway;
use crate::cache::{CacheConfig, ResultCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, default_max_input_chars};
use crate::governance::budget::DEFAULT_DAILY_TOKENS;
use crate::governance::limiter::DEFAULT_MAX_PER_MINUTE;
use crate::governance::{CostEstimator, RateLimiter, ScriptWeightedEstimator, TokenBudget};
use crate::ledger::{LedgerConfig, UsageLedger};
use crate::queue::{QueueConfig, RequestQueue, RetryConfig};
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::transport::{DEFAULT_TIMEOUT, HttpTransport, Transport};
use crate::{HermodError, Result};

/// Main entry point for creating gateway instances.
pub struct Hermod;

impl Hermod {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> HermodBuilder {
        HermodBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// ```rust,no_run
/// # async fn run() -> hermod::Result<()> {
/// use hermod::{Hermod, TextGateway};
///
/// let gateway = Hermod::builder()
///     .endpoint("https://proxy.example.com/api")
///     .state_path("/tmp/hermod-state.json")
///     .max_requests_per_minute(20)
///     .build()
///     .await?;
///
/// let hello = gateway.translate("你好", "en").await?;
/// println!("{}", hello.translated);
/// # Ok(())
/// # }
/// ```
pub struct HermodBuilder {
    transport: Option<Arc<dyn Transport>>,
    endpoint: Option<String>,
    timeout: Duration,
    store: Option<Arc<dyn KeyValueStore>>,
    state_path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
    estimator: Option<Arc<dyn CostEstimator>>,
    cache: CacheConfig,
    ledger: LedgerConfig,
    queue: QueueConfig,
    max_requests_per_minute: u32,
    max_daily_tokens: u64,
    max_input_chars: usize,
    sweeper: bool,
}

impl HermodBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
            store: None,
            state_path: None,
            clock: None,
            estimator: None,
            cache: CacheConfig::default(),
            ledger: LedgerConfig::default(),
            queue: QueueConfig::default(),
            max_requests_per_minute: DEFAULT_MAX_PER_MINUTE,
            max_daily_tokens: DEFAULT_DAILY_TOKENS,
            max_input_chars: default_max_input_chars(),
            sweeper: true,
        }
    }

    /// Start from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new()
            .endpoint(config.transport.endpoint.clone())
            .timeout(config.request_timeout())
            .cache(config.cache_config())
            .ledger(config.ledger_config())
            .queue(config.queue_config())
            .max_requests_per_minute(config.limits.max_requests_per_minute)
            .max_daily_tokens(config.limits.max_daily_tokens)
            .max_input_chars(config.limits.max_input_chars);
        if let Some(path) = config.state_path() {
            builder = builder.state_path(path);
        }
        builder
    }

    /// Use a custom upstream transport. Takes precedence over [`endpoint`](Self::endpoint).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// POST requests to this URL over HTTP.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Per-request HTTP timeout (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Persist governance state through a custom store.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Persist governance state to a JSON file.
    ///
    /// Without a store or a state path, state lives in memory only.
    pub fn state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }

    /// Time source for budget days and rate windows (default: system clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Cost estimation strategy (default: [`ScriptWeightedEstimator`]).
    pub fn estimator(mut self, estimator: Arc<dyn CostEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn ledger(mut self, config: LedgerConfig) -> Self {
        self.ledger = config;
        self
    }

    pub fn queue(mut self, config: QueueConfig) -> Self {
        self.queue = config;
        self
    }

    /// Shorthand for replacing only the queue's retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.queue.retry = retry;
        self
    }

    pub fn max_requests_per_minute(mut self, n: u32) -> Self {
        self.max_requests_per_minute = n;
        self
    }

    pub fn max_daily_tokens(mut self, n: u64) -> Self {
        self.max_daily_tokens = n;
        self
    }

    /// Longest accepted input, in characters (default: 1000).
    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.max_input_chars = n;
        self
    }

    /// Disable the background cache sweeper. Expired entries are still
    /// invisible to reads.
    pub fn without_sweeper(mut self) -> Self {
        self.sweeper = false;
        self
    }

    /// Build the gateway.
    ///
    /// Spawns the queue worker (and the cache sweeper unless disabled) on
    /// the current tokio runtime and restores persisted usage state. A
    /// failure to restore is logged; the gateway starts with empty stats.
    pub async fn build(self) -> Result<GovernedGateway> {
        let transport: Arc<dyn Transport> = match (self.transport, self.endpoint) {
            (Some(transport), _) => transport,
            (None, Some(endpoint)) => Arc::new(HttpTransport::with_timeout(endpoint, self.timeout)?),
            (None, None) => {
                return Err(HermodError::Configuration(
                    "no upstream transport or endpoint configured".into(),
                ));
            }
        };

        let store: Arc<dyn KeyValueStore> = match (self.store, self.state_path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(JsonFileStore::new(path)),
            (None, None) => Arc::new(MemoryStore::new()),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let estimator = self
            .estimator
            .unwrap_or_else(|| Arc::new(ScriptWeightedEstimator::default()));

        let limiter = Arc::new(RateLimiter::new(
            self.max_requests_per_minute,
            clock.clone(),
        ));
        let budget = Arc::new(TokenBudget::new(
            self.max_daily_tokens,
            estimator,
            store.clone(),
            clock.clone(),
        ));
        let ledger = Arc::new(UsageLedger::new(self.ledger, store, clock));
        if let Err(e) = ledger.load().await {
            warn!(error = %e, "failed to restore usage ledger, starting empty");
        }

        let cache = ResultCache::new(&self.cache);
        let sweeper = self.sweeper.then(|| cache.spawn_sweeper());

        debug!(
            transport = transport.name(),
            max_requests_per_minute = self.max_requests_per_minute,
            max_daily_tokens = self.max_daily_tokens,
            "building governed gateway"
        );
        let queue = RequestQueue::spawn(
            limiter.clone(),
            budget.clone(),
            cache.clone(),
            ledger.clone(),
            transport.clone(),
            self.queue,
        );

        Ok(GovernedGateway::new(
            queue,
            cache,
            sweeper,
            budget,
            limiter,
            ledger,
            transport,
            self.max_input_chars,
        ))
    }
}

impl Default for HermodBuilder {
    fn default() -> Self {
        Self::new()
    }
}
