//! Result caching.
//!
//! - [`Fingerprint`]: deterministic key over (kind, normalized text, params).
//! - [`ResultCache`]: per-kind TTL cache of upstream result bodies, with a
//!   background sweeper bounding memory even without reads.

mod fingerprint;
pub mod result;

pub use fingerprint::Fingerprint;
pub use result::{CacheConfig, ResultCache, SweepHandle};
