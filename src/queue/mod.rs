//! Serialized request queue.
//!
//! [`RequestQueue`] is the single serialization point for admission
//! decisions. Every governed request moves through:
//!
//! ```text
//!  add() ──► Pending ──tryAdmit──► Admitted ──checkOnly──► Dispatched ──► Settled
//!                │                     │                        │
//!                ▼                     ▼                        ├── ok:  cache.set, reserve, log(success)
//!        RateLimitExceeded       BudgetExceeded                 └── err: log(failure) after retries
//!        (never enqueued)        (logged, not retried)
//! ```
//!
//! The rate check runs synchronously inside [`RequestQueue::add`], so a
//! rejection is observable before anything is enqueued. Budget checks,
//! dispatch, caching, reservation, and ledger writes all happen on one
//! worker task that processes a single task at a time in FIFO order and
//! pauses briefly after each settlement.
//!
//! When the queue is dropped the channel closes; the worker keeps going
//! until every already-enqueued task is settled, then exits.

pub mod retry;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::cache::{Fingerprint, ResultCache};
use crate::governance::{RateLimiter, TokenBudget};
use crate::ledger::UsageLedger;
use crate::telemetry;
use crate::transport::Transport;
use crate::types::{OperationKind, UpstreamRequest};
use crate::{HermodError, Result};

pub use retry::{Backoff, RetryConfig};
use retry::with_retry;

/// Default pause between settling one task and pulling the next.
pub const DEFAULT_DRAIN_PAUSE: Duration = Duration::from_millis(100);

/// Queue behaviour.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub retry: RetryConfig,
    /// Pause after each settlement. Default: 100ms.
    pub drain_pause: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            drain_pause: DEFAULT_DRAIN_PAUSE,
        }
    }
}

impl QueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn drain_pause(mut self, pause: Duration) -> Self {
        self.drain_pause = pause;
        self
    }
}

/// Lifecycle of a governed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Admitted,
    Dispatched,
    Settled { success: bool },
}

/// A request submitted to the queue.
///
/// ```rust
/// # use hermod::{Fingerprint, GovernedRequest, OperationKind, UpstreamRequest};
/// let req = GovernedRequest::new(
///     OperationKind::Translation,
///     UpstreamRequest::Translate { text: "你好".into(), target_lang: "en".into() },
/// )
/// .cost_text("你好")
/// .fingerprint(Fingerprint::new(OperationKind::Translation, "你好", &["en"]))
/// .detail("targetLang", "en");
/// ```
#[derive(Debug, Clone)]
pub struct GovernedRequest {
    pub kind: OperationKind,
    pub payload: UpstreamRequest,
    /// Where to cache the result on success. `None` disables caching.
    pub fingerprint: Option<Fingerprint>,
    /// Text the cost estimate is computed from.
    pub cost_text: String,
    /// Extra fields recorded in the history entry.
    pub details: Map<String, Value>,
}

impl GovernedRequest {
    pub fn new(kind: OperationKind, payload: UpstreamRequest) -> Self {
        Self {
            kind,
            payload,
            fingerprint: None,
            cost_text: String::new(),
            details: Map::new(),
        }
    }

    pub fn fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn cost_text(mut self, text: impl Into<String>) -> Self {
        self.cost_text = text.into();
        self
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

struct QueuedTask {
    request: GovernedRequest,
    cost: u64,
    enqueued_at: tokio::time::Instant,
    reply: oneshot::Sender<Result<Value>>,
}

/// Everything the worker needs to process a task.
struct Worker {
    budget: Arc<TokenBudget>,
    cache: ResultCache,
    ledger: Arc<UsageLedger>,
    transport: Arc<dyn Transport>,
    config: QueueConfig,
    pending: Arc<AtomicUsize>,
}

/// FIFO queue admitting, dispatching, and settling governed requests.
pub struct RequestQueue {
    tx: mpsc::UnboundedSender<QueuedTask>,
    limiter: Arc<RateLimiter>,
    budget: Arc<TokenBudget>,
    pending: Arc<AtomicUsize>,
    worker: JoinHandle<()>,
}

impl RequestQueue {
    /// Create the queue and spawn its worker on the current tokio runtime.
    pub fn spawn(
        limiter: Arc<RateLimiter>,
        budget: Arc<TokenBudget>,
        cache: ResultCache,
        ledger: Arc<UsageLedger>,
        transport: Arc<dyn Transport>,
        config: QueueConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker = Worker {
            budget: budget.clone(),
            cache,
            ledger,
            transport,
            config,
            pending: pending.clone(),
        };
        let worker = tokio::spawn(worker.run(rx));
        Self {
            tx,
            limiter,
            budget,
            pending,
            worker,
        }
    }

    /// Submit a request and wait for its settlement.
    ///
    /// Fails immediately with [`HermodError::RateLimited`] if the current
    /// rate window is full; nothing is enqueued in that case.
    pub async fn add(&self, request: GovernedRequest) -> Result<Value> {
        let kind = request.kind;
        if !self.limiter.try_admit() {
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL, "kind" => kind.stats_key())
                .increment(1);
            let retry_after = self.limiter.retry_after();
            debug!(%kind, state = ?TaskState::Pending, ?retry_after, "rate limit exceeded");
            return Err(HermodError::RateLimited {
                limit: self.limiter.max_per_minute(),
                retry_after,
            });
        }

        let cost = self.budget.estimate_cost(&request.cost_text);
        let (reply, settled) = oneshot::channel();
        let task = QueuedTask {
            request,
            cost,
            enqueued_at: tokio::time::Instant::now(),
            reply,
        };
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(task).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(HermodError::QueueClosed);
        }
        debug!(%kind, cost, state = ?TaskState::Admitted, "task enqueued");

        settled.await.map_err(|_| HermodError::QueueClosed)?
    }

    /// Tasks enqueued but not yet settled.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Stop accepting work and wait until every enqueued task is settled.
    pub async fn shutdown(self) {
        let Self { tx, worker, .. } = self;
        drop(tx);
        if let Err(e) = worker.await {
            warn!(error = %e, "request queue worker ended abnormally");
        }
    }
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<QueuedTask>) {
        while let Some(task) = rx.recv().await {
            self.process(task).await;
            if !self.config.drain_pause.is_zero() {
                tokio::time::sleep(self.config.drain_pause).await;
            }
        }
        debug!("request queue closed and drained");
    }

    #[instrument(name = "governed_request", skip_all, fields(kind = %task.request.kind, cost = task.cost))]
    async fn process(&self, task: QueuedTask) {
        let QueuedTask {
            request,
            cost,
            enqueued_at,
            reply,
        } = task;
        let kind = request.kind;

        let outcome = self.execute(&request, cost).await;
        let success = outcome.is_ok();

        let mut details = request.details;
        if let Err(e) = &outcome {
            details.insert("error".into(), Value::from(e.code()));
            details.insert("message".into(), Value::from(e.to_string()));
        }
        self.ledger.log(kind, success, details).await;

        let status = if success { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "kind" => kind.stats_key(), "status" => status)
            .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "kind" => kind.stats_key())
            .record(enqueued_at.elapsed().as_secs_f64());
        debug!(state = ?TaskState::Settled { success }, "task settled");

        self.pending.fetch_sub(1, Ordering::SeqCst);
        if reply.send(outcome).is_err() {
            debug!("caller went away before settlement");
        }
    }

    async fn execute(&self, request: &GovernedRequest, cost: u64) -> Result<Value> {
        let kind = request.kind;
        if !self.budget.check_only(cost).await {
            metrics::counter!(telemetry::BUDGET_REJECTED_TOTAL, "kind" => kind.stats_key())
                .increment(1);
            return Err(HermodError::BudgetExceeded {
                requested: cost,
                remaining: self.budget.remaining().await,
            });
        }

        debug!(state = ?TaskState::Dispatched, transport = self.transport.name(), "dispatching");
        let value = with_retry(&self.config.retry, kind, || {
            self.transport.request(&request.payload)
        })
        .await?;

        if let Some(fingerprint) = request.fingerprint {
            self.cache.set(fingerprint, value.clone()).await;
        }
        if !self.budget.reserve(cost).await {
            // only this worker reserves, so the pre-flight check should hold
            warn!(cost, "budget reservation refused after successful dispatch");
        }
        Ok(value)
    }
}
