//! Platform NFC radio contract

use async_trait::async_trait;

use crate::{EventSink, TagHandle, TransportError};

/// The platform's contactless reader
///
/// Notifications flow back through the [`EventSink`] passed to [`begin`](Radio::begin);
/// the radio must stop using a sink once [`invalidate`](Radio::invalidate) is called.
#[async_trait]
pub trait Radio: Send + Sync + 'static {
    /// Whether the device has a usable NFC radio
    fn is_available(&self) -> bool;

    /// Start a polling session and show `prompt` to the user
    fn begin(&self, events: EventSink, prompt: &str) -> Result<(), TransportError>;

    /// Restart polling inside the current session without tearing it down
    fn restart_polling(&self);

    /// Connect to a detected tag
    async fn connect(&self, tag: &TagHandle) -> Result<(), TransportError>;

    /// Replace the user-visible prompt
    fn set_alert_message(&self, message: &str);

    /// Tear down the polling session, showing `error` if given
    fn invalidate(&self, error: Option<&str>);

    /// Platform acknowledgment of a connected card (haptic feedback)
    fn acknowledge(&self) {}
}
