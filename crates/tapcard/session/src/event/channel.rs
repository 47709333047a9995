//! Channel-based event handling for radio sessions

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, trace, warn};

use crate::{InvalidationReason, Result, SessionError, TagHandle};

#[derive(Debug)]
struct Senders {
    active: UnboundedSender<()>,
    invalidated: UnboundedSender<InvalidationReason>,
    tags: UnboundedSender<Vec<TagHandle>>,
}

/// Producer half of the event bridge, handed to the platform radio
///
/// Cloning is cheap; every clone feeds the same channels and [`finish`](Self::finish)
/// on any clone closes them for all.
#[derive(Debug, Clone)]
pub struct EventSink {
    senders: Arc<Mutex<Option<Senders>>>,
}

impl EventSink {
    /// Report that the radio session became active
    pub fn session_became_active(&self) {
        self.send("active", |senders| senders.active.send(()).is_ok());
    }

    /// Report that the platform invalidated the radio session
    pub fn session_invalidated(&self, reason: InvalidationReason) {
        self.send("invalidated", |senders| {
            senders.invalidated.send(reason).is_ok()
        });
    }

    /// Report a batch of detected tags
    pub fn tags_detected(&self, tags: Vec<TagHandle>) {
        self.send("tags", |senders| senders.tags.send(tags).is_ok());
    }

    /// Close all channels; later notifications are dropped
    pub fn finish(&self) {
        if self.senders.lock().take().is_some() {
            debug!("Event bridge finished");
        }
    }

    /// Whether [`finish`](Self::finish) was called
    pub fn is_finished(&self) -> bool {
        self.senders.lock().is_none()
    }

    fn send(&self, kind: &'static str, send: impl FnOnce(&Senders) -> bool) {
        match self.senders.lock().as_ref() {
            Some(senders) => {
                if !send(senders) {
                    trace!(kind, "Event receiver dropped");
                }
            }
            None => trace!(kind, "Ignoring event after the bridge finished"),
        }
    }
}

/// Consumer half of the event bridge, owned by the session
#[derive(Debug)]
pub struct SessionEvents {
    active: UnboundedReceiver<()>,
    invalidated: UnboundedReceiver<InvalidationReason>,
    tags: UnboundedReceiver<Vec<TagHandle>>,
    sink: EventSink,
}

impl SessionEvents {
    /// Wait for the next batch of detected tags
    ///
    /// Fails with the platform's reason if the session is invalidated first, and
    /// with [`SessionError::Cancelled`] if the bridge finishes first.
    pub async fn next_tags(&mut self) -> Result<Vec<TagHandle>> {
        loop {
            tokio::select! {
                biased;
                Some(reason) = self.invalidated.recv() => {
                    warn!(%reason, "Radio session invalidated while waiting for a tag");
                    return Err(SessionError::Invalidated(reason));
                }
                Some(tags) = self.tags.recv() => {
                    debug!(count = tags.len(), "Tags detected");
                    return Ok(tags);
                }
                Some(()) = self.active.recv() => debug!("Radio session became active"),
                else => {
                    debug!("Event stream finished before a tag was detected");
                    return Err(SessionError::Cancelled);
                }
            }
        }
    }

    /// Take a pending invalidation without waiting
    pub fn take_invalidation(&mut self) -> Option<InvalidationReason> {
        self.invalidated.try_recv().ok()
    }

    /// Discard tag batches and activity notifications nobody waited for
    pub fn drain_stale(&mut self) {
        while let Ok(tags) = self.tags.try_recv() {
            trace!(count = tags.len(), "Discarding stale tag batch");
        }
        while self.active.try_recv().is_ok() {}
    }

    /// Close the channels feeding this receiver
    pub fn finish(&self) {
        self.sink.finish();
    }

    /// Whether the producing side was finished
    pub fn is_finished(&self) -> bool {
        self.sink.is_finished()
    }

    /// Producer handle feeding this receiver
    pub(crate) fn sink(&self) -> EventSink {
        self.sink.clone()
    }
}

pub(crate) fn session_channel() -> (EventSink, SessionEvents) {
    let (active_tx, active) = unbounded_channel();
    let (invalidated_tx, invalidated) = unbounded_channel();
    let (tags_tx, tags) = unbounded_channel();

    let sink = EventSink {
        senders: Arc::new(Mutex::new(Some(Senders {
            active: active_tx,
            invalidated: invalidated_tx,
            tags: tags_tx,
        }))),
    };
    let events = SessionEvents {
        active,
        invalidated,
        tags,
        sink: sink.clone(),
    };
    (sink, events)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::event::channel;

    #[tokio::test]
    async fn test_next_tags_skips_activity() {
        let (sink, mut events) = channel();
        sink.session_became_active();
        sink.tags_detected(Vec::new());

        let tags = events.next_tags().await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_invalidation_wins_over_waiting() {
        let (sink, mut events) = channel();
        sink.session_invalidated(InvalidationReason::UserCanceled);

        let err = events.next_tags().await.unwrap_err();
        assert_eq!(err, SessionError::Invalidated(InvalidationReason::UserCanceled));
        assert!(err.is_cancellation());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_resolves_pending_wait() {
        let (sink, mut events) = channel();
        let waiter = tokio::spawn(async move { events.next_tags().await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!waiter.is_finished());

        sink.finish();
        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err, SessionError::Cancelled);
    }

    #[tokio::test]
    async fn test_events_after_finish_are_dropped() {
        let (sink, mut events) = channel();
        events.finish();
        assert!(sink.is_finished());

        sink.tags_detected(Vec::new());
        sink.session_invalidated(InvalidationReason::SystemBusy);
        assert_eq!(events.take_invalidation(), None);
        assert_eq!(events.next_tags().await.unwrap_err(), SessionError::Cancelled);
    }

    #[tokio::test]
    async fn test_drain_stale_discards_buffered_batches() {
        let (sink, mut events) = channel();
        sink.tags_detected(Vec::new());
        sink.tags_detected(Vec::new());
        events.drain_stale();

        sink.finish();
        assert_eq!(events.next_tags().await.unwrap_err(), SessionError::Cancelled);
    }
}
