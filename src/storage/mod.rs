//! Persistence port.
//!
//! Governance state survives restarts through a small async key-value
//! abstraction. Values are JSON; only a handful of named slots are used:
//!
//! | slot            | owner                                   |
//! |-----------------|-----------------------------------------|
//! | `usageStats`    | [`UsageLedger`](crate::UsageLedger)     |
//! | `usageHistory`  | [`UsageLedger`](crate::UsageLedger)     |
//! | `tokenCount`    | [`TokenBudget`](crate::TokenBudget)     |
//! | `lastReset`     | [`TokenBudget`](crate::TokenBudget)     |
//!
//! Two implementations ship with the crate: [`MemoryStore`] for tests and
//! embedding, and [`JsonFileStore`] which keeps every slot in one JSON file.

mod file;
mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Slot holding aggregate usage counters.
pub const USAGE_STATS_KEY: &str = "usageStats";
/// Slot holding the bounded usage history.
pub const USAGE_HISTORY_KEY: &str = "usageHistory";
/// Slot holding today's consumed token count.
pub const TOKEN_COUNT_KEY: &str = "tokenCount";
/// Slot holding the budget window start (epoch milliseconds).
pub const LAST_RESET_KEY: &str = "lastReset";

/// Partial record returned by [`KeyValueStore::get`].
pub type Record = HashMap<String, Value>;

/// Async key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the requested keys. Missing keys are simply absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<Record>;

    /// Write every entry of `record`, leaving other keys untouched.
    async fn set(&self, record: Record) -> Result<()>;
}
