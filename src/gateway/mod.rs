//! Gateway implementations

mod builder;
mod governed;

pub use builder::{Hermod, HermodBuilder};
pub use governed::GovernedGateway;
