//! Daily token budget.
//!
//! [`TokenBudget`] tracks estimated token consumption for the current UTC
//! day against a hard cap. The state is persisted through the
//! [`KeyValueStore`] after every mutation so it survives restarts.
//!
//! # Rollover
//!
//! Day rollover is the pure function [`BudgetState::rolled_over`], applied
//! under the budget's lock before every check. Concurrent reservations that
//! straddle midnight therefore observe exactly one reset.
//!
//! # Access
//!
//! Checking and reserving are crate-private: only the
//! [`RequestQueue`](crate::RequestQueue) worker admits work against the
//! budget. Callers can read [`snapshot()`](TokenBudget::snapshot) and
//! [`remaining()`](TokenBudget::remaining).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::CostEstimator;
use crate::clock::Clock;
use crate::storage::{KeyValueStore, LAST_RESET_KEY, Record, TOKEN_COUNT_KEY};
use crate::telemetry;

/// Default daily cap on estimated tokens.
pub const DEFAULT_DAILY_TOKENS: u64 = 100_000;

/// Token consumption for one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetState {
    pub daily_count: u64,
    pub window_start: DateTime<Utc>,
}

impl BudgetState {
    /// Empty window starting at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            daily_count: 0,
            window_start: now,
        }
    }

    /// The state as it should be at `now`: reset if the UTC date changed.
    pub fn rolled_over(self, now: DateTime<Utc>) -> Self {
        if now.date_naive() != self.window_start.date_naive() {
            Self::fresh(now)
        } else {
            self
        }
    }

    /// Whether `cost` more tokens stay within `cap`.
    pub fn admits(&self, cost: u64, cap: u64) -> bool {
        self.daily_count
            .checked_add(cost)
            .is_some_and(|total| total <= cap)
    }

    fn to_record(self) -> Record {
        Record::from([
            (TOKEN_COUNT_KEY.to_owned(), json!(self.daily_count)),
            (
                LAST_RESET_KEY.to_owned(),
                json!(self.window_start.timestamp_millis()),
            ),
        ])
    }

    fn from_record(record: &Record) -> Option<Self> {
        let daily_count = record.get(TOKEN_COUNT_KEY)?.as_u64()?;
        let millis = record.get(LAST_RESET_KEY)?.as_i64()?;
        Some(Self {
            daily_count,
            window_start: DateTime::from_timestamp_millis(millis)?,
        })
    }
}

/// Persisted daily token budget.
pub struct TokenBudget {
    daily_cap: u64,
    estimator: Arc<dyn CostEstimator>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    // None until loaded from the store
    state: Mutex<Option<BudgetState>>,
}

impl TokenBudget {
    pub fn new(
        daily_cap: u64,
        estimator: Arc<dyn CostEstimator>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            daily_cap,
            estimator,
            store,
            clock,
            state: Mutex::new(None),
        }
    }

    pub fn daily_cap(&self) -> u64 {
        self.daily_cap
    }

    /// Estimated cost of submitting `text`.
    pub fn estimate_cost(&self, text: &str) -> u64 {
        self.estimator.estimate(text)
    }

    /// Current state after rollover.
    pub async fn snapshot(&self) -> BudgetState {
        let mut guard = self.state.lock().await;
        self.current(&mut guard).await
    }

    /// Tokens left today.
    pub async fn remaining(&self) -> u64 {
        let state = self.snapshot().await;
        self.daily_cap.saturating_sub(state.daily_count)
    }

    /// Would `cost` fit? Never mutates the count.
    pub(crate) async fn check_only(&self, cost: u64) -> bool {
        let mut guard = self.state.lock().await;
        let state = self.current(&mut guard).await;
        state.admits(cost, self.daily_cap)
    }

    /// Commit `cost` if it fits, persisting the new count.
    ///
    /// Returns `false` and leaves the state unchanged otherwise.
    pub(crate) async fn reserve(&self, cost: u64) -> bool {
        let mut guard = self.state.lock().await;
        let state = self.current(&mut guard).await;
        if !state.admits(cost, self.daily_cap) {
            debug!(
                cost,
                daily_count = state.daily_count,
                cap = self.daily_cap,
                "budget reservation refused"
            );
            return false;
        }
        let next = BudgetState {
            daily_count: state.daily_count + cost,
            ..state
        };
        *guard = Some(next);
        metrics::counter!(telemetry::TOKENS_RESERVED_TOTAL).increment(cost);
        self.persist(next).await;
        true
    }

    /// Load if needed, then apply rollover. Caller holds the lock.
    async fn current(&self, slot: &mut Option<BudgetState>) -> BudgetState {
        let now = self.clock.now();
        let loaded = match *slot {
            Some(state) => state,
            None => self.load(now).await,
        };
        let rolled = loaded.rolled_over(now);
        if rolled != loaded {
            info!(
                previous = loaded.daily_count,
                day = %now.date_naive(),
                "daily token budget reset"
            );
            self.persist(rolled).await;
        }
        *slot = Some(rolled);
        rolled
    }

    async fn load(&self, now: DateTime<Utc>) -> BudgetState {
        match self.store.get(&[TOKEN_COUNT_KEY, LAST_RESET_KEY]).await {
            Ok(record) => BudgetState::from_record(&record).unwrap_or_else(|| BudgetState::fresh(now)),
            Err(e) => {
                warn!(error = %e, "failed to load token budget, starting from zero");
                BudgetState::fresh(now)
            }
        }
    }

    async fn persist(&self, state: BudgetState) {
        if let Err(e) = self.store.set(state.to_record()).await {
            metrics::counter!(telemetry::PERSIST_FAILURES_TOTAL, "component" => "budget")
                .increment(1);
            warn!(error = %e, "failed to persist token budget");
        }
    }
}
