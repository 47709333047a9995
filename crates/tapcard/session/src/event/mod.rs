//! Bridge from platform radio callbacks to awaitable channels
//!
//! The platform reports three kinds of notifications, each on its own channel:
//!
//! - the radio session became active
//! - the radio session was invalidated, with a reason
//! - one or more tags were detected
//!
//! The producing half, [`EventSink`], is handed to the platform radio. The
//! consuming half, [`SessionEvents`], belongs to the session that started the
//! radio. Finishing the sink closes all three channels, so pending awaits
//! resolve instead of hanging.

pub mod channel;
pub use channel::{EventSink, SessionEvents};

/// Create a connected sink/receiver pair for one radio session
pub fn channel() -> (EventSink, SessionEvents) {
    channel::session_channel()
}
