//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use hermod::{
    GovernedGateway, Hermod, HermodBuilder, HermodError, KeyValueStore, ManualClock, QueueConfig,
    Record, Result, Transport, UpstreamRequest,
};

type Handler = Box<dyn Fn(&UpstreamRequest, u32) -> Result<Value> + Send + Sync>;

/// Transport answering from a closure of `(payload, call index)`.
pub struct MockTransport {
    handler: Handler,
    calls: AtomicU32,
    payloads: Mutex<Vec<UpstreamRequest>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&UpstreamRequest, u32) -> Result<Value> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: AtomicU32::new(0),
            payloads: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with `body`.
    pub fn ok(body: Value) -> Arc<Self> {
        Self::new(move |_, _| Ok(body.clone()))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<UpstreamRequest> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn request(&self, payload: &UpstreamRequest) -> Result<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        (self.handler)(payload, n)
    }
}

/// Store whose every read and write fails.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _keys: &[&str]) -> Result<Record> {
        Err(HermodError::Persistence("disk unavailable".into()))
    }

    async fn set(&self, _record: Record) -> Result<()> {
        Err(HermodError::Persistence("disk unavailable".into()))
    }
}

/// 2024-03-10 09:00:00 UTC.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(start()))
}

/// Builder with a mock transport, manual clock, in-memory state, no
/// sweeper, and no drain pause.
pub fn builder(transport: Arc<MockTransport>, clock: Arc<ManualClock>) -> HermodBuilder {
    Hermod::builder()
        .transport(transport)
        .clock(clock)
        .queue(QueueConfig::new().drain_pause(Duration::ZERO))
        .without_sweeper()
}

pub async fn gateway(transport: Arc<MockTransport>) -> GovernedGateway {
    builder(transport, manual_clock()).build().await.unwrap()
}
