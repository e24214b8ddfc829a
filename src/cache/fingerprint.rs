use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::types::OperationKind;

/// Deterministic cache key for a governed request.
///
/// Derived from the operation kind, the trimmed input text, and the
/// operation's target parameters (target language, context type, ...).
/// Parameter order matters.
///
/// Uses `DefaultHasher` (SipHash), which is deterministic within a process
/// lifetime. That is sufficient because the cache itself is in-memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    kind: OperationKind,
    digest: u64,
}

impl Fingerprint {
    pub fn new(kind: OperationKind, text: &str, params: &[&str]) -> Self {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        text.trim().hash(&mut hasher);
        for p in params {
            p.hash(&mut hasher);
        }
        Self {
            kind,
            digest: hasher.finish(),
        }
    }

    /// Operation kind this fingerprint belongs to. Selects the TTL.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}
