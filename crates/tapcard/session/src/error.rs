//! Error types for the card session driver

use derive_more::Display;
use tapcard_apdu_core::{CardReaderError, ResponseError};
use tapcard_codec::CodecError;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Why the platform tore down a radio session
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum InvalidationReason {
    /// The user dismissed the system prompt
    #[display("user cancelled")]
    UserCanceled,
    /// The platform's session lifetime or detection deadline elapsed
    #[display("session timed out")]
    SessionTimeout,
    /// Another radio session holds the hardware
    #[display("radio busy")]
    SystemBusy,
    /// Any other platform reason
    #[display("{_0}")]
    Other(String),
}

/// Errors surfaced by the tag transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The tag left the field or stopped answering
    #[error("Tag connection lost")]
    ConnectionLost,

    /// The radio could not start a session
    #[error("Radio session could not be started: {0}")]
    Begin(String),

    /// Connecting to a detected tag failed
    #[error("Failed to connect to tag: {0}")]
    Connect(String),

    /// Transmission failed for another reason
    #[error("Transmission failed: {0}")]
    Transmission(String),
}

/// Error type for card session operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    //
    // Transport and session errors
    //
    /// The device has no usable NFC radio
    #[error("NFC radio is not available")]
    RadioUnavailable,

    /// A session already holds the radio
    #[error("A card session is already active")]
    AlreadyActive,

    /// No tag is connected (the session is idle or was invalidated)
    #[error("No card is connected")]
    NotConnected,

    /// The platform invalidated the radio session
    #[error("Radio session invalidated: {0}")]
    Invalidated(InvalidationReason),

    /// Tag transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    //
    // Protocol errors
    //
    /// No detected tag speaks the expected protocol with the expected AID
    #[error("Unknown Card")]
    UnknownTag,

    /// The detection stream ended before a tag was found
    #[error("Card session cancelled")]
    Cancelled,

    /// The card answered with fewer than two bytes
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// A chained exchange was requested without commands
    #[error("Command chain is empty")]
    EmptyChain,

    //
    // Card application errors
    //
    /// The card reported a failure through its status word
    #[error(transparent)]
    Card(#[from] CardReaderError),

    //
    // Codec errors, including defects
    //
    /// The vendor SDK failed to build or parse a buffer
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl SessionError {
    /// Whether this error is a defect in the calling sequence
    pub const fn is_defect(&self) -> bool {
        match self {
            Self::Codec(error) => error.is_defect(),
            _ => false,
        }
    }

    /// Whether this error means the session was cancelled rather than failed
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Cancelled
                | Self::Invalidated(
                    InvalidationReason::UserCanceled | InvalidationReason::SessionTimeout
                )
        )
    }

    /// The card-application view of this error, if it has one
    pub const fn card_error(&self) -> Option<CardReaderError> {
        match self {
            Self::Card(error) => Some(*error),
            Self::Transport(TransportError::ConnectionLost) => {
                Some(CardReaderError::ConnectionLost)
            }
            _ => None,
        }
    }
}
