//! Card application errors decoded from status words
//!
//! Every status word other than `90 00` maps onto exactly one
//! [`CardReaderError`] variant; [`CardReaderError::OperationFailed`] is the
//! catch-all.

use crate::response::status::StatusWord;

/// Errors reported by the card application through its status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CardReaderError {
    /// The card rejected a malformed parameter (length, P1/P2, data field)
    #[error("Invalid parameter ({0})")]
    InvalidParameter(StatusWord),

    /// The presented card does not run the expected application
    #[error("Wrong or unsupported card ({0})")]
    WrongCard(StatusWord),

    /// PIN verification failed, carrying the number of attempts remaining
    #[error("PIN verification failed, {0} attempts remaining")]
    VerifyPinFailed(u8),

    /// The card reported that the logical link to the application was lost
    #[error("Connection to the card was lost")]
    ConnectionLost,

    /// Any other failure reported by the card
    #[error("Card operation failed ({0})")]
    OperationFailed(StatusWord),
}

impl CardReaderError {
    /// Decode a status word, returning `None` for success (`90 00`)
    pub const fn from_status(status: StatusWord) -> Option<Self> {
        let error = match (status.sw1, status.sw2) {
            (0x90, 0x00) => return None,
            (0x63, tries) => Self::VerifyPinFailed(tries),
            (0x67, 0x00) | (0x6A, 0x80) | (0x6A, 0x86) | (0x6B, 0x00) | (0x6C, _) => {
                Self::InvalidParameter(status)
            }
            (0x6A, 0x82) | (0x6D, 0x00) | (0x6E, 0x00) | (0x69, 0x99) => Self::WrongCard(status),
            (0x68, 0x81) | (0x68, 0x82) => Self::ConnectionLost,
            _ => Self::OperationFailed(status),
        };
        Some(error)
    }

    /// Check a status word, turning anything but `90 00` into an error
    pub const fn check(status: StatusWord) -> Result<(), Self> {
        match Self::from_status(status) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// The status word behind this error, when the variant keeps it
    pub const fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::InvalidParameter(status)
            | Self::WrongCard(status)
            | Self::OperationFailed(status) => Some(*status),
            Self::VerifyPinFailed(_) | Self::ConnectionLost => None,
        }
    }

    /// Number of PIN attempts remaining, if this is a PIN failure
    pub const fn remaining_attempts(&self) -> Option<u8> {
        match self {
            Self::VerifyPinFailed(tries) => Some(*tries),
            _ => None,
        }
    }
}
