//! Framing errors for APDU commands and responses

/// Error raised while parsing a command buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Buffer is shorter than the 4 header bytes or disagrees with its Lc byte
    #[error("Invalid command length: {0}")]
    InvalidLength(usize),

    /// Command data does not fit a short APDU
    #[error("Command data too long: {0} bytes")]
    DataTooLong(usize),
}

/// Error raised while parsing a response buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// Incomplete response (less than 2 bytes)
    #[error("Incomplete response: {0} bytes")]
    Incomplete(usize),

    /// Response payload did not have the expected layout
    #[error("Parse error: {0}")]
    Parse(&'static str),
}

impl ResponseError {
    /// Create a parse error with a message
    pub const fn parse(message: &'static str) -> Self {
        Self::Parse(message)
    }
}
