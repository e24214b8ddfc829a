//! Usage accounting types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OperationKind;

/// One settled governed operation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub success: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

/// Aggregate counters.
///
/// Successful operations count under their kind's stats key; failures of
/// any kind count toward `error_count`. Persisted as a flat object, e.g.
/// `{"translations": 3, "errorCount": 1, "lastSync": 1700000000000}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
    #[serde(rename = "errorCount", default)]
    pub error_count: u64,
    #[serde(
        rename = "lastSync",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_sync: Option<DateTime<Utc>>,
}

impl UsageStats {
    /// Successful operations of `kind`.
    pub fn count(&self, kind: OperationKind) -> u64 {
        self.counts.get(kind.stats_key()).copied().unwrap_or(0)
    }
}

/// What [`UsageLedger::stats()`](crate::UsageLedger::stats) returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub stats: UsageStats,
    /// Most recent records, newest first.
    pub recent_history: Vec<HistoryRecord>,
}
