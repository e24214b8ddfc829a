use std::error::Error as _;
use std::time::Duration;

use hermod::{ErrorKind, HermodError, Result};

#[test]
fn test_error_display() {
    let err = HermodError::InputTooLong {
        field: "text",
        limit: 1000,
        actual: 1200,
    };
    assert_eq!(err.to_string(), "text exceeds 1000 characters (got 1200)");
    assert_eq!(HermodError::EmptyInput("text").to_string(), "text is required");
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(HermodError::QueueClosed)
    }
    assert!(returns_error().is_err());
}

// ============================================================================
// Kinds and codes
// ============================================================================

#[test]
fn kinds_map_to_stable_codes() {
    let cases = [
        (HermodError::EmptyInput("text"), "VALIDATION_ERROR"),
        (
            HermodError::RateLimited {
                limit: 10,
                retry_after: Duration::from_secs(30),
            },
            "RATE_LIMIT_EXCEEDED",
        ),
        (
            HermodError::BudgetExceeded {
                requested: 10,
                remaining: 2,
            },
            "BUDGET_EXCEEDED",
        ),
        (HermodError::Http("reset".into()), "TRANSPORT_ERROR"),
        (HermodError::EmptyResponse("topics"), "TRANSPORT_ERROR"),
        (HermodError::Persistence("disk full".into()), "PERSISTENCE_ERROR"),
        (HermodError::Configuration("bad".into()), "CONFIGURATION_ERROR"),
        (HermodError::QueueClosed, "QUEUE_CLOSED"),
    ];
    for (err, code) in cases {
        assert_eq!(err.code(), code, "{err}");
        assert_eq!(err.kind().to_string(), code);
    }
}

#[test]
fn exhausted_retries_are_transport_errors() {
    let err = HermodError::RetriesExhausted {
        attempts: 3,
        last: Box::new(HermodError::Http("timeout".into())),
    };
    assert_eq!(err.kind(), ErrorKind::Transport);
}

// ============================================================================
// Transient error classification
// ============================================================================

#[test]
fn transient_errors() {
    assert!(HermodError::Http("connection reset".into()).is_transient());
    assert!(HermodError::EmptyResponse("translated").is_transient());
    for status in [408, 429, 500, 502, 503, 504] {
        assert!(
            HermodError::Api {
                status,
                message: String::new()
            }
            .is_transient(),
            "{status} should be transient"
        );
    }
    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(HermodError::from(json).is_transient());
}

#[test]
fn permanent_errors() {
    for status in [400, 401, 403, 404, 422] {
        assert!(
            !HermodError::Api {
                status,
                message: String::new()
            }
            .is_transient(),
            "{status} should be permanent"
        );
    }
    assert!(!HermodError::EmptyInput("text").is_transient());
    assert!(
        !HermodError::RateLimited {
            limit: 1,
            retry_after: Duration::from_secs(60)
        }
        .is_transient()
    );
    assert!(
        !HermodError::BudgetExceeded {
            requested: 1,
            remaining: 0
        }
        .is_transient()
    );
    assert!(!HermodError::QueueClosed.is_transient());
    assert!(
        !HermodError::RetriesExhausted {
            attempts: 3,
            last: Box::new(HermodError::Http("timeout".into())),
        }
        .is_transient()
    );
}

// ============================================================================
// Source chain
// ============================================================================

#[test]
fn exhausted_retries_keep_last_cause() {
    let err = HermodError::RetriesExhausted {
        attempts: 3,
        last: Box::new(HermodError::Api {
            status: 503,
            message: "unavailable".into(),
        }),
    };
    assert_eq!(
        err.to_string(),
        "request failed after 3 attempts: API error (503): unavailable"
    );
    let source = err.source().unwrap();
    assert_eq!(source.to_string(), "API error (503): unavailable");
}

#[test]
fn admission_errors_have_no_source() {
    let err = HermodError::RateLimited {
        limit: 10,
        retry_after: Duration::from_secs(12),
    };
    assert!(err.source().is_none());
}
