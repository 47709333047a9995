use derive_more::Display;
use tokio::time::Instant;

use crate::Purpose;

/// Lifecycle phase of a [`CardSession`](super::CardSession)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Phase {
    /// No session was started yet
    #[default]
    Idle,
    /// Beginning the radio session and waiting for the first tag
    Starting,
    /// A wallet card is connected
    Connected,
    /// Re-detecting the card inside the current radio session
    Renewing,
    /// Tearing the radio session down and beginning a new one
    Restarting,
    /// The session ended; a new one may be started
    Invalidated,
}

impl Phase {
    /// Whether a session holds the radio in this phase
    pub const fn is_live(&self) -> bool {
        matches!(
            self,
            Self::Starting | Self::Connected | Self::Renewing | Self::Restarting
        )
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current phase
    pub phase: Phase,
    /// Purpose of the current or last session
    pub purpose: Option<Purpose>,
    /// When the radio session was last begun
    pub session_started_at: Option<Instant>,
    /// When a tag was last connected
    pub last_renewed_at: Option<Instant>,
    /// Whether a tag handle is held
    pub connected: bool,
}
