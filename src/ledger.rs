//! Usage ledger: aggregate counters plus a bounded, newest-first history.
//!
//! [`UsageLedger::log`] never fails. Persistence is best-effort: a failed
//! write is logged and counted, and the in-memory state stays authoritative.
//! Writes are serialized and always persist the latest state, so a slow
//! earlier write can never overwrite a newer one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::storage::{KeyValueStore, Record, USAGE_HISTORY_KEY, USAGE_STATS_KEY};
use crate::telemetry;
use crate::types::{HistoryRecord, OperationKind, UsageSnapshot, UsageStats};
use crate::{HermodError, Result};

/// Retention settings for the ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Records kept in history. Default: 100.
    pub max_history: usize,
    /// Records returned by [`UsageLedger::stats`]. Default: 10.
    pub recent_history: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            recent_history: 10,
        }
    }
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_history(mut self, n: usize) -> Self {
        self.max_history = n;
        self
    }

    pub fn recent_history(mut self, n: usize) -> Self {
        self.recent_history = n;
        self
    }
}

#[derive(Default)]
struct LedgerState {
    stats: UsageStats,
    history: VecDeque<HistoryRecord>,
}

/// Persisted record of governed operation outcomes.
pub struct UsageLedger {
    config: LedgerConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<LedgerState>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl UsageLedger {
    pub fn new(config: LedgerConfig, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
            state: Mutex::new(LedgerState::default()),
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Restore stats and history from the store, replacing in-memory state.
    ///
    /// Missing slots leave the corresponding state untouched.
    pub async fn load(&self) -> Result<()> {
        let record = self
            .store
            .get(&[USAGE_STATS_KEY, USAGE_HISTORY_KEY])
            .await?;
        let stats: Option<UsageStats> = record
            .get(USAGE_STATS_KEY)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(|e| HermodError::Persistence(format!("corrupt usage stats: {e}")))?;
        let history: Option<Vec<HistoryRecord>> = record
            .get(USAGE_HISTORY_KEY)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(|e| HermodError::Persistence(format!("corrupt usage history: {e}")))?;

        let mut state = self.lock_state();
        if let Some(stats) = stats {
            state.stats = stats;
        }
        if let Some(history) = history {
            state.history = history.into_iter().take(self.config.max_history).collect();
        }
        debug!(records = state.history.len(), "usage ledger loaded");
        Ok(())
    }

    /// Record the outcome of one governed operation.
    pub async fn log(&self, kind: OperationKind, success: bool, details: Map<String, Value>) {
        {
            let mut state = self.lock_state();
            if success {
                *state
                    .stats
                    .counts
                    .entry(kind.stats_key().to_owned())
                    .or_insert(0) += 1;
            } else {
                state.stats.error_count += 1;
            }
            state.history.push_front(HistoryRecord {
                kind,
                success,
                timestamp: self.clock.now(),
                details,
            });
            state.history.truncate(self.config.max_history);
        }
        self.persist().await;
    }

    /// Counters plus the most recent records, newest first.
    pub fn stats(&self) -> UsageSnapshot {
        let state = self.lock_state();
        UsageSnapshot {
            stats: state.stats.clone(),
            recent_history: state
                .history
                .iter()
                .take(self.config.recent_history)
                .cloned()
                .collect(),
        }
    }

    /// Every retained record, newest first.
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.lock_state().history.iter().cloned().collect()
    }

    /// Clear counters and history.
    pub async fn reset(&self) {
        *self.lock_state() = LedgerState::default();
        self.persist().await;
    }

    async fn persist(&self) {
        let _write = self.persist_lock.lock().await;
        let now = self.clock.now();
        let record = {
            let state = self.lock_state();
            let mut stats = state.stats.clone();
            stats.last_sync = Some(now);
            let history: Vec<&HistoryRecord> = state.history.iter().collect();
            match (serde_json::to_value(&stats), serde_json::to_value(&history)) {
                (Ok(stats), Ok(history)) => Record::from([
                    (USAGE_STATS_KEY.to_owned(), stats),
                    (USAGE_HISTORY_KEY.to_owned(), history),
                ]),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(error = %e, "failed to encode usage ledger");
                    return;
                }
            }
        };
        match self.store.set(record).await {
            Ok(()) => self.lock_state().stats.last_sync = Some(now),
            Err(e) => {
                metrics::counter!(telemetry::PERSIST_FAILURES_TOTAL, "component" => "ledger")
                    .increment(1);
                warn!(error = %e, "failed to persist usage ledger");
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _keys: &[&str]) -> Result<Record> {
            Err(HermodError::Persistence("disk on fire".into()))
        }

        async fn set(&self, _record: Record) -> Result<()> {
            Err(HermodError::Persistence("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn history_is_bounded_and_newest_first() {
        let clock = Arc::new(ManualClock::new(start()));
        let ledger = UsageLedger::new(
            LedgerConfig::new().max_history(3).recent_history(2),
            Arc::new(MemoryStore::new()),
            clock.clone(),
        );
        for i in 0..5 {
            let mut details = Map::new();
            details.insert("n".into(), json!(i));
            ledger.log(OperationKind::Translation, true, details).await;
            clock.advance(std::time::Duration::from_secs(1));
        }

        let history = ledger.history();
        assert_eq!(history.len(), 3);
        let order: Vec<_> = history.iter().map(|r| r.details["n"].clone()).collect();
        assert_eq!(order, [json!(4), json!(3), json!(2)]);

        let snapshot = ledger.stats();
        assert_eq!(snapshot.recent_history.len(), 2);
        assert_eq!(snapshot.stats.count(OperationKind::Translation), 5);
    }

    #[tokio::test]
    async fn failures_count_as_errors_only() {
        let ledger = UsageLedger::new(
            LedgerConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(start())),
        );
        ledger.log(OperationKind::Compliance, false, Map::new()).await;
        ledger.log(OperationKind::Compliance, true, Map::new()).await;

        let stats = ledger.stats().stats;
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.count(OperationKind::Compliance), 1);
        assert_eq!(stats.last_sync, Some(start()));
    }

    #[tokio::test]
    async fn persist_failure_is_swallowed() {
        let ledger = UsageLedger::new(
            LedgerConfig::default(),
            Arc::new(FailingStore),
            Arc::new(ManualClock::new(start())),
        );
        ledger.log(OperationKind::TrendingTopics, true, Map::new()).await;

        let stats = ledger.stats().stats;
        assert_eq!(stats.count(OperationKind::TrendingTopics), 1);
        assert_eq!(stats.last_sync, None);
        assert!(ledger.load().await.is_err());
    }

    #[tokio::test]
    async fn reload_restores_state() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let first = UsageLedger::new(LedgerConfig::default(), store.clone(), clock.clone());
        first.log(OperationKind::ReplySuggestion, true, Map::new()).await;
        first.log(OperationKind::Translation, false, Map::new()).await;

        let second = UsageLedger::new(LedgerConfig::default(), store.clone(), clock);
        second.load().await.unwrap();
        assert_eq!(second.stats(), first.stats());

        second.reset().await;
        assert_eq!(second.history().len(), 0);
        assert_eq!(store.snapshot().await[USAGE_HISTORY_KEY], json!([]));
    }
}
