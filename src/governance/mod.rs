//! Admission control: the daily token budget and the per-minute rate limiter.
//!
//! Both components expose only read-only accessors publicly. Taking a rate
//! slot or reserving tokens is reserved to the
//! [`RequestQueue`](crate::RequestQueue), the single serialization point
//! for admission decisions.

pub mod budget;
mod estimator;
pub mod limiter;

pub use budget::{BudgetState, TokenBudget};
pub use estimator::{CostEstimator, ScriptWeightedEstimator};
pub use limiter::{RateLimiter, RateWindow};
