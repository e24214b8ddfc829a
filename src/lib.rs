//! Hermod - request governance for metered text-processing APIs
//!
//! This crate sits between an application and a rate-limited, metered,
//! remote text-processing API (translation, cultural annotation, sentiment,
//! compliance checks). Every operation goes through the same pipeline:
//!
//! ```text
//! caller ─► ResultCache ─hit─► result
//!               │ miss
//!               ▼
//!         RequestQueue.add ─► RateLimiter ─► TokenBudget ─► Transport (retry)
//!                                                              │
//!                     result ◄─ UsageLedger.log ◄─ TokenBudget.reserve ◄─ ResultCache.set
//! ```
//!
//! The [`RequestQueue`] is the only component that admits work against the
//! [`RateLimiter`] and the [`TokenBudget`]; their mutating methods are not
//! part of the public API.
//!
//! # Example
//!
//! ```rust,no_run
//! use hermod::{ExplanationContext, Hermod, TextGateway};
//!
//! #[tokio::main]
//! async fn main() -> hermod::Result<()> {
//!     let gateway = Hermod::builder()
//!         .endpoint("https://proxy.example.com/api")
//!         .build()
//!         .await?;
//!
//!     let translation = gateway.translate("你好", "en").await?;
//!     println!("{}", translation.translated);
//!
//!     let explanation = gateway
//!         .cultural_explanation("绝绝子", &ExplanationContext::new().context_type("slang"))
//!         .await?;
//!     println!("{}: {}", explanation.explanation_type.as_str(), explanation.brief);
//!
//!     let stats = gateway.stats();
//!     println!("{} translations", stats.stats.count(hermod::OperationKind::Translation));
//!
//!     gateway.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every failure carries a stable [`ErrorKind`] and [`code()`](HermodError::code)
//! so callers can branch without matching on messages:
//!
//! ```rust
//! use hermod::{ErrorKind, HermodError};
//!
//! let err = HermodError::EmptyInput("text");
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! assert_eq!(err.code(), "VALIDATION_ERROR");
//! ```

pub mod cache;
pub mod clock;
pub mod config;
mod convert;
pub mod culture;
pub mod error;
pub mod gateway;
pub mod governance;
pub mod ledger;
pub mod queue;
pub mod storage;
pub mod telemetry;
pub mod traits;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use error::{ErrorKind, HermodError, Result};
pub use gateway::{GovernedGateway, Hermod, HermodBuilder};
pub use traits::TextGateway;

pub use cache::{CacheConfig, Fingerprint, ResultCache, SweepHandle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use governance::{
    BudgetState, CostEstimator, RateLimiter, RateWindow, ScriptWeightedEstimator, TokenBudget,
};
pub use ledger::{LedgerConfig, UsageLedger};
pub use queue::{Backoff, GovernedRequest, QueueConfig, RequestQueue, RetryConfig, TaskState};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, Record};
pub use transport::{HttpTransport, Transport};

// Re-export all types
pub use types::{
    ComplianceReport, CulturalExplanation, ExplanationContext, ExplanationType, HistoryRecord,
    OperationKind, ReplyTemplate, SentimentAnalysis, TitleOptimization, Translation, TrendingTopic,
    UpstreamRequest, UsageSnapshot, UsageStats,
};
