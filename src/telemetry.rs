//! Telemetry metric name constants.
//!
//! Centralised metric names for hermod operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! All metrics are prefixed with `hermod_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `kind`: operation kind stats key (e.g. "translations", "replies")
//! - `status`: outcome: "ok" or "error"

/// Total governed requests settled by the queue.
///
/// Labels: `kind`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "hermod_requests_total";

/// Time from enqueue to settlement, in seconds.
///
/// Labels: `kind`.
pub const REQUEST_DURATION_SECONDS: &str = "hermod_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `kind`.
pub const RETRIES_TOTAL: &str = "hermod_retries_total";

/// Requests rejected by the per-minute rate limiter.
///
/// Labels: `kind`.
pub const RATE_LIMITED_TOTAL: &str = "hermod_rate_limited_total";

/// Requests rejected by the daily token budget.
///
/// Labels: `kind`.
pub const BUDGET_REJECTED_TOTAL: &str = "hermod_budget_rejected_total";

/// Estimated tokens committed against the daily budget.
pub const TOKENS_RESERVED_TOTAL: &str = "hermod_tokens_reserved_total";

/// Total result cache hits.
///
/// Labels: `kind`.
pub const CACHE_HITS_TOTAL: &str = "hermod_cache_hits_total";

/// Total result cache misses.
///
/// Labels: `kind`.
pub const CACHE_MISSES_TOTAL: &str = "hermod_cache_misses_total";

/// Persistence writes that failed and were swallowed.
///
/// Labels: `component` ("budget" | "ledger").
pub const PERSIST_FAILURES_TOTAL: &str = "hermod_persist_failures_total";
