//! Hermod error types

use std::time::Duration;

/// Stable classification of a [`HermodError`].
///
/// Callers branch on the kind (or its [`code()`](ErrorKind::code)) instead of
/// matching on human-readable messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty, missing or oversized input. Fails fast, never queued.
    Validation,
    /// Rejected before admission by the per-minute rate limiter.
    RateLimitExceeded,
    /// Rejected before dispatch by the daily token budget.
    BudgetExceeded,
    /// Upstream failure (network, non-2xx, undecodable body).
    Transport,
    /// Persistence port failure. Never surfaced from governed operations.
    Persistence,
    /// Invalid configuration.
    Configuration,
    /// The request queue worker is no longer running.
    QueueClosed,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::BudgetExceeded => "BUDGET_EXCEEDED",
            ErrorKind::Transport => "TRANSPORT_ERROR",
            ErrorKind::Persistence => "PERSISTENCE_ERROR",
            ErrorKind::Configuration => "CONFIGURATION_ERROR",
            ErrorKind::QueueClosed => "QUEUE_CLOSED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Hermod error types
#[derive(Debug, thiserror::Error)]
pub enum HermodError {
    // Validation errors
    #[error("{0} is required")]
    EmptyInput(&'static str),

    #[error("{field} exceeds {limit} characters (got {actual})")]
    InputTooLong {
        field: &'static str,
        limit: usize,
        actual: usize,
    },

    // Admission errors
    #[error("rate limit exceeded: {limit} requests per minute, retry after {retry_after:?}")]
    RateLimited { limit: u32, retry_after: Duration },

    #[error("daily token budget exceeded: requested {requested}, remaining {remaining}")]
    BudgetExceeded { requested: u64, remaining: u64 },

    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty response from upstream: missing `{0}`")]
    EmptyResponse(&'static str),

    /// Final transport failure after every attempt was used.
    ///
    /// The last underlying error is kept as [`source()`](std::error::Error::source).
    #[error("request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<HermodError>,
    },

    // Infrastructure errors
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request queue is closed")]
    QueueClosed,
}

impl HermodError {
    /// Stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HermodError::EmptyInput(_) | HermodError::InputTooLong { .. } => ErrorKind::Validation,
            HermodError::RateLimited { .. } => ErrorKind::RateLimitExceeded,
            HermodError::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
            HermodError::Http(_)
            | HermodError::Api { .. }
            | HermodError::Json(_)
            | HermodError::EmptyResponse(_)
            | HermodError::RetriesExhausted { .. } => ErrorKind::Transport,
            HermodError::Persistence(_) => ErrorKind::Persistence,
            HermodError::Configuration(_) => ErrorKind::Configuration,
            HermodError::QueueClosed => ErrorKind::QueueClosed,
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Whether a retry of the same upstream call may succeed.
    ///
    /// Only transport-level failures qualify. Validation and admission
    /// rejections are never retried.
    pub fn is_transient(&self) -> bool {
        match self {
            HermodError::Http(_) | HermodError::Json(_) | HermodError::EmptyResponse(_) => true,
            HermodError::Api { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for Hermod operations
pub type Result<T> = std::result::Result<T, HermodError>;
