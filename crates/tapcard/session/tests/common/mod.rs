//! Scripted radio and tags shared by the integration tests
#![allow(dead_code, unreachable_pub)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tapcard_session::{
    ARCULUS_AID, CardSession, EventSink, InvalidationReason, Radio, SessionPolicy, Tag,
    TagFamily, TagHandle, TransportError,
};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const OK: &[u8] = &[0x90, 0x00];

#[derive(Debug, Default)]
struct RadioLog {
    sink: Option<EventSink>,
    batch: Vec<TagHandle>,
    prompts: Vec<String>,
    restarts: usize,
    invalidations: Vec<Option<String>>,
    connects: usize,
    acknowledgements: usize,
    alerts: Vec<String>,
}

/// Radio that reports a configured batch of tags whenever polling (re)starts
#[derive(Debug)]
pub struct FakeRadio {
    available: AtomicBool,
    auto_detect: AtomicBool,
    fail_connect: AtomicBool,
    log: Mutex<RadioLog>,
}

impl FakeRadio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            available: AtomicBool::new(true),
            auto_detect: AtomicBool::new(true),
            fail_connect: AtomicBool::new(false),
            log: Mutex::new(RadioLog::default()),
        })
    }

    /// Radio presenting a single wallet card
    pub fn with_wallet() -> (Arc<Self>, Arc<FakeTag>) {
        let radio = Self::new();
        let tag = FakeTag::wallet();
        radio.present(vec![tag.clone() as TagHandle]);
        (radio, tag)
    }

    pub fn present(&self, tags: Vec<TagHandle>) {
        self.log.lock().batch = tags;
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_auto_detect(&self, auto_detect: bool) {
        self.auto_detect.store(auto_detect, Ordering::SeqCst);
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Push the configured batch to the live session now
    pub fn detect_now(&self) {
        let log = self.log.lock();
        if let Some(sink) = &log.sink {
            sink.tags_detected(log.batch.clone());
        }
    }

    /// Invalidate the live session from the platform side
    pub fn expire(&self, reason: InvalidationReason) {
        if let Some(sink) = &self.log.lock().sink {
            sink.session_invalidated(reason);
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.log.lock().prompts.clone()
    }

    pub fn begins(&self) -> usize {
        self.log.lock().prompts.len()
    }

    pub fn restarts(&self) -> usize {
        self.log.lock().restarts
    }

    pub fn invalidations(&self) -> Vec<Option<String>> {
        self.log.lock().invalidations.clone()
    }

    pub fn connects(&self) -> usize {
        self.log.lock().connects
    }

    pub fn acknowledgements(&self) -> usize {
        self.log.lock().acknowledgements
    }

    pub fn alerts(&self) -> Vec<String> {
        self.log.lock().alerts.clone()
    }

    fn report(&self, log: &RadioLog) {
        if !self.auto_detect.load(Ordering::SeqCst) {
            return;
        }
        if let Some(sink) = &log.sink {
            sink.session_became_active();
            sink.tags_detected(log.batch.clone());
        }
    }
}

#[async_trait]
impl Radio for FakeRadio {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn begin(&self, events: EventSink, prompt: &str) -> Result<(), TransportError> {
        let mut log = self.log.lock();
        log.prompts.push(prompt.to_owned());
        log.sink = Some(events);
        self.report(&log);
        Ok(())
    }

    fn restart_polling(&self) {
        let mut log = self.log.lock();
        log.restarts += 1;
        self.report(&log);
    }

    async fn connect(&self, _tag: &TagHandle) -> Result<(), TransportError> {
        self.log.lock().connects += 1;
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(TransportError::Connect("tag moved away".into()));
        }
        Ok(())
    }

    fn set_alert_message(&self, message: &str) {
        self.log.lock().alerts.push(message.to_owned());
    }

    fn invalidate(&self, error: Option<&str>) {
        let mut log = self.log.lock();
        log.sink = None;
        log.invalidations.push(error.map(str::to_owned));
    }

    fn acknowledge(&self) {
        self.log.lock().acknowledgements += 1;
    }
}

/// Tag answering from a script, `90 00` once the script runs out
#[derive(Debug)]
pub struct FakeTag {
    family: TagFamily,
    aid: Option<String>,
    latency: Duration,
    responses: Mutex<VecDeque<Result<Bytes, TransportError>>>,
    sent: Mutex<Vec<Bytes>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTag {
    pub fn new(family: TagFamily, aid: Option<&str>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            family,
            aid: aid.map(str::to_owned),
            latency,
            responses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn wallet() -> Arc<Self> {
        Self::new(TagFamily::Iso7816, Some(ARCULUS_AID), Duration::ZERO)
    }

    pub fn slow_wallet(latency: Duration) -> Arc<Self> {
        Self::new(TagFamily::Iso7816, Some(ARCULUS_AID), latency)
    }

    pub fn respond(&self, response: &[u8]) {
        self.responses
            .lock()
            .push_back(Ok(Bytes::copy_from_slice(response)));
    }

    pub fn fail(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tag for FakeTag {
    fn family(&self) -> TagFamily {
        self.family
    }

    fn selected_aid(&self) -> Option<&str> {
        self.aid.as_deref()
    }

    async fn transmit(&self, command: Bytes) -> Result<Bytes, TransportError> {
        self.sent.lock().push(command);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::from_static(OK)))
    }
}

pub fn session(radio: &Arc<FakeRadio>) -> Arc<CardSession<FakeRadio>> {
    init_tracing();
    Arc::new(CardSession::new(radio.clone()))
}

pub fn session_with_policy(
    radio: &Arc<FakeRadio>,
    policy: SessionPolicy,
) -> Arc<CardSession<FakeRadio>> {
    init_tracing();
    Arc::new(CardSession::with_policy(radio.clone(), policy))
}

pub fn apdu(bytes: &[u8]) -> Bytes {
    Bytes::copy_from_slice(bytes)
}
