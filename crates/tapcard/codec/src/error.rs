//! Error types for the command codec

use tapcard_apdu_core::ResponseError;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while building or parsing vendor SDK buffers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A vendor SDK call returned a null buffer
    ///
    /// The SDK only does so when handed an invalid wallet or session context,
    /// which is a defect in the calling sequence and never worth retrying.
    #[error("Vendor SDK returned a null buffer from {call}")]
    NullBuffer {
        /// SDK entry point that failed
        call: &'static str,
    },

    /// A vendor SDK parser rejected the card's response
    #[error("Vendor SDK rejected {call} response with code {code}")]
    Rejected {
        /// SDK entry point that failed
        call: &'static str,
        /// Non-zero status returned by the SDK
        code: i32,
    },

    /// A buffer returned by the SDK did not have the expected layout
    #[error("Malformed {call} buffer: {source}")]
    Malformed {
        /// SDK entry point that produced the buffer
        call: &'static str,
        /// Underlying parse failure
        source: ResponseError,
    },
}

impl CodecError {
    /// Whether this error is a defect in the calling sequence rather than a runtime condition
    pub const fn is_defect(&self) -> bool {
        matches!(self, Self::NullBuffer { .. })
    }
}
