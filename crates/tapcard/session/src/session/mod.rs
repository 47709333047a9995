//! Session manager: the single owner of the radio and the connected card
//!
//! Every operation that touches the tag goes through one async mutex, so exchanges
//! never overlap and start/renew/restart never race an exchange. Before each
//! exchange the connection is checked against the [`SessionPolicy`]: a stale
//! connection is renewed inside the current radio session, an old session is torn
//! down and begun again after a cool-down.

mod phase;

pub use phase::{Phase, SessionSnapshot};

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tapcard_apdu_core::{CardReaderError, Response, StatusWord};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

use crate::event::{self, EventSink, SessionEvents};
use crate::policy::{Clock, Freshness, SessionPolicy, TokioClock};
use crate::{Purpose, Radio, Result, SessionError, TagHandle, TagValidator};

#[derive(Debug)]
struct Connection {
    tag: TagHandle,
    started_at: Instant,
    renewed_at: Instant,
}

#[derive(Debug, Default)]
struct SessionState {
    phase: Phase,
    purpose: Option<Purpose>,
    connection: Option<Connection>,
    events: Option<SessionEvents>,
}

/// Serialized access to a wallet card over the platform radio
pub struct CardSession<R> {
    radio: Arc<R>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    validator: TagValidator,
    state: Mutex<SessionState>,
    /// Producer half of the live bridge, reachable without the state lock
    sink: parking_lot::Mutex<Option<EventSink>>,
    /// Mirrors `phase.is_live()`, readable without the state lock
    live: AtomicBool,
}

impl<R> fmt::Debug for CardSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardSession")
            .field("policy", &self.policy)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<R: Radio> CardSession<R> {
    /// Create a session manager with the default policy
    pub fn new(radio: Arc<R>) -> Self {
        Self::with_policy(radio, SessionPolicy::default())
    }

    /// Create a session manager with a custom policy
    pub fn with_policy(radio: Arc<R>, policy: SessionPolicy) -> Self {
        Self {
            radio,
            clock: Arc::new(TokioClock),
            validator: TagValidator::new(policy.expected_aid),
            policy,
            state: Mutex::new(SessionState::default()),
            sink: parking_lot::Mutex::new(None),
            live: AtomicBool::new(false),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The platform radio
    pub const fn radio(&self) -> &Arc<R> {
        &self.radio
    }

    /// The active policy
    pub const fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Begin a session and connect to the first wallet card presented
    #[instrument(level = "debug", skip_all, fields(purpose = %purpose))]
    pub async fn start_session(&self, purpose: Purpose) -> Result<()> {
        if !self.radio.is_available() {
            warn!("NFC radio is not available");
            return Err(SessionError::RadioUnavailable);
        }

        if self.live.load(Ordering::Acquire) {
            warn!("A session already holds the radio");
            return Err(SessionError::AlreadyActive);
        }

        let guard = self.state.lock().await;
        if guard.phase.is_live() {
            warn!(phase = %guard.phase, "A session already holds the radio");
            return Err(SessionError::AlreadyActive);
        }

        let mut state = Exclusive::new(self, guard);
        let prompt = purpose.prompt();
        state.phase = Phase::Starting;
        self.live.store(true, Ordering::Release);
        state.purpose = Some(purpose);
        state.connection = None;
        state.events = None;

        let events = self.open_bridge();
        let result = self.begin(&mut state, &prompt, events).await;
        match &result {
            Ok(()) => {
                state.phase = Phase::Connected;
                debug!("Session started");
            }
            Err(error) => self.fail(&mut state, error),
        }
        state.disarm();
        result
    }

    /// End the current session, showing `error` to the user if given
    ///
    /// Finishes the event bridge before waiting for the state lock, so a start
    /// blocked on tag detection resolves at once and exchanges already queued
    /// fail with [`SessionError::Cancelled`]. Calling it again is a no-op.
    #[instrument(level = "debug", skip_all)]
    pub async fn end_session(&self, error: Option<&SessionError>) {
        let message = error.map(ToString::to_string);
        self.teardown_radio(message.as_deref());

        let mut state = self.state.lock().await;
        self.invalidate(&mut state, message.as_deref());
    }

    /// Exchange one APDU with the connected card
    #[instrument(level = "debug", skip_all, fields(len = command.len()))]
    pub async fn send_receive(&self, command: Bytes) -> Result<Bytes> {
        self.exchange(std::slice::from_ref(&command)).await
    }

    /// Exchange a chain of APDUs, returning only the last response
    ///
    /// Intermediate responses must report success; the first failure aborts the
    /// chain and nothing after it is sent.
    #[instrument(level = "debug", skip_all, fields(commands = commands.len()))]
    pub async fn send_receive_chain(&self, commands: &[Bytes]) -> Result<Bytes> {
        if commands.is_empty() {
            return Err(SessionError::EmptyChain);
        }
        self.exchange(commands).await
    }

    /// Update the user-visible prompt
    pub fn set_message(&self, message: &str) {
        trace!(message, "Updating prompt");
        self.radio.set_alert_message(message);
    }

    /// Current phase, purpose and timestamps
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            phase: state.phase,
            purpose: state.purpose.clone(),
            session_started_at: state.connection.as_ref().map(|c| c.started_at),
            last_renewed_at: state.connection.as_ref().map(|c| c.renewed_at),
            connected: state.connection.is_some(),
        }
    }

    async fn exchange(&self, commands: &[Bytes]) -> Result<Bytes> {
        let mut guard = self.state.lock().await;
        if guard.phase != Phase::Connected {
            debug!(phase = %guard.phase, "Exchange requested without a connected card");
            return Err(SessionError::NotConnected);
        }
        if guard.events.as_ref().is_none_or(SessionEvents::is_finished) {
            debug!("Session ended while the exchange was queued");
            self.invalidate(&mut guard, None);
            return Err(SessionError::Cancelled);
        }

        let mut state = Exclusive::new(self, guard);
        let result = self.exchange_locked(&mut state, commands).await;
        match &result {
            Ok(_) | Err(SessionError::Card(_)) => {}
            Err(error) => self.fail(&mut state, error),
        }
        state.disarm();
        result
    }

    async fn exchange_locked(
        &self,
        state: &mut SessionState,
        commands: &[Bytes],
    ) -> Result<Bytes> {
        let Some((last, chain)) = commands.split_last() else {
            return Err(SessionError::EmptyChain);
        };
        let tag = self.ensure_fresh(state).await?;

        for (step, command) in chain.iter().enumerate() {
            let (_, status) = transmit(&tag, command).await?;
            if let Err(error) = CardReaderError::check(status) {
                warn!(step, %status, "Chained command failed, aborting chain");
                return Err(error.into());
            }
        }

        let (response, status) = transmit(&tag, last).await?;
        if !status.is_success() {
            warn!(%status, description = status.description(), "Card returned non-success status");
        }
        Ok(response)
    }

    /// Renew or restart per policy, returning the tag to talk to
    async fn ensure_fresh(&self, state: &mut SessionState) -> Result<TagHandle> {
        if let Some(reason) = state.events.as_mut().and_then(SessionEvents::take_invalidation) {
            return Err(SessionError::Invalidated(reason));
        }

        let connection = state.connection.as_ref().ok_or(SessionError::NotConnected)?;
        let now = self.clock.now();
        let age = now.saturating_duration_since(connection.started_at);
        let since_renew = now.saturating_duration_since(connection.renewed_at);

        match self.policy.freshness(age, since_renew) {
            Freshness::Fresh => {}
            Freshness::Renew => {
                debug!(?since_renew, "Card connection is stale");
                self.renew(state).await?;
            }
            Freshness::Restart => {
                debug!(?age, "Radio session is too old");
                self.restart(state).await?;
            }
        }

        state
            .connection
            .as_ref()
            .map(|connection| Arc::clone(&connection.tag))
            .ok_or(SessionError::NotConnected)
    }

    async fn renew(&self, state: &mut SessionState) -> Result<()> {
        state.phase = Phase::Renewing;
        let events = state.events.as_mut().ok_or(SessionError::NotConnected)?;
        events.drain_stale();
        self.radio.restart_polling();
        let tag = self.detect(events).await?;

        let now = self.clock.now();
        if let Some(connection) = state.connection.as_mut() {
            connection.tag = tag;
            connection.renewed_at = now;
        }
        state.phase = Phase::Connected;
        debug!("Card connection renewed");
        Ok(())
    }

    async fn restart(&self, state: &mut SessionState) -> Result<()> {
        state.phase = Phase::Restarting;
        state.connection = None;
        state.events = None;
        self.teardown_radio(None);

        // A bridge is installed before the pause so `end_session` can cancel it.
        let events = self.open_bridge();
        debug!(cooldown = ?self.policy.restart_cooldown, "Waiting before restarting radio session");
        self.clock.sleep(self.policy.restart_cooldown).await;

        let prompt = state.purpose.as_ref().map(Purpose::prompt).unwrap_or_default();
        self.begin(state, &prompt, events).await?;
        state.phase = Phase::Connected;
        debug!("Radio session restarted");
        Ok(())
    }

    /// Begin polling and connect the first wallet card; sets both timestamps
    async fn begin(
        &self,
        state: &mut SessionState,
        prompt: &str,
        mut events: SessionEvents,
    ) -> Result<()> {
        if events.is_finished() {
            return Err(SessionError::Cancelled);
        }
        self.radio.begin(events.sink(), prompt)?;
        if events.is_finished() {
            // Ended while the radio was starting; nothing else will tear it down.
            self.radio.invalidate(None);
            return Err(SessionError::Cancelled);
        }

        let tag = self.detect(&mut events).await?;
        let now = self.clock.now();
        state.connection = Some(Connection {
            tag,
            started_at: now,
            renewed_at: now,
        });
        state.events = Some(events);
        Ok(())
    }

    async fn detect(&self, events: &mut SessionEvents) -> Result<TagHandle> {
        let tags = events.next_tags().await?;
        let tag = self.validator.validate(&*self.radio, &tags).await?;
        if events.is_finished() {
            debug!("Session ended while connecting");
            return Err(SessionError::Cancelled);
        }
        Ok(tag)
    }

    fn open_bridge(&self) -> SessionEvents {
        let (sink, events) = event::channel();
        if let Some(stale) = self.sink.lock().replace(sink) {
            stale.finish();
        }
        events
    }

    /// Finish the bridge and invalidate the radio session, once
    fn teardown_radio(&self, message: Option<&str>) {
        let Some(sink) = self.sink.lock().take() else {
            return;
        };
        sink.finish();
        debug!(?message, "Invalidating radio session");
        self.radio.invalidate(message);
    }

    fn invalidate(&self, state: &mut SessionState, message: Option<&str>) {
        self.teardown_radio(message);
        state.connection = None;
        state.events = None;
        self.live.store(false, Ordering::Release);
        if !matches!(state.phase, Phase::Idle | Phase::Invalidated) {
            debug!(from = %state.phase, "Session invalidated");
            state.phase = Phase::Invalidated;
        }
    }

    fn fail(&self, state: &mut SessionState, error: &SessionError) {
        warn!(%error, phase = %state.phase, "Ending card session after failure");
        let message = (!error.is_cancellation()).then(|| error.to_string());
        self.invalidate(state, message.as_deref());
    }
}

async fn transmit(tag: &TagHandle, command: &Bytes) -> Result<(Bytes, StatusWord)> {
    trace!(command = %hex::encode(command), "Sending APDU");
    let response = tag.transmit(command.clone()).await?;
    trace!(response = %hex::encode(&response), "Received APDU response");
    let status = Response::from_bytes(&response)?.status();
    Ok((response, status))
}

/// State lock held by one operation
///
/// Dropped while armed (the operation's future was cancelled mid-flight), it
/// tears the radio down and leaves the session invalidated.
struct Exclusive<'a, R: Radio> {
    session: &'a CardSession<R>,
    state: MutexGuard<'a, SessionState>,
    armed: bool,
}

impl<'a, R: Radio> Exclusive<'a, R> {
    fn new(session: &'a CardSession<R>, state: MutexGuard<'a, SessionState>) -> Self {
        Self {
            session,
            state,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<R: Radio> Deref for Exclusive<'_, R> {
    type Target = SessionState;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl<R: Radio> DerefMut for Exclusive<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl<R: Radio> Drop for Exclusive<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            warn!(phase = %self.state.phase, "Card operation cancelled, invalidating session");
            self.session.invalidate(&mut self.state, None);
        }
    }
}
