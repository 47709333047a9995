//! APDU framing for contactless wallet cards
//!
//! This crate provides the value types exchanged with a card over an ISO/IEC 7816-4
//! link and the interpretation of the status words the card answers with.
//!
//! ## Overview
//!
//! - [`Command`]: a short APDU (`CLA INS P1 P2 [Lc data] [Le]`)
//! - [`Response`]: payload followed by exactly two status bytes
//! - [`StatusWord`]: the trailing `SW1 SW2` pair
//! - [`CardReaderError`]: the total mapping from a non-success status word onto
//!   the errors a wallet caller acts upon
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod card_error;
pub mod command;
pub mod error;
pub mod response;

pub use card_error::CardReaderError;
pub use command::{Command, ExpectedLength};
pub use error::{CommandError, ResponseError};
pub use response::status::StatusWord;
pub use response::{Response, utils};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, CardReaderError, Command, CommandError, Response, ResponseError,
        response::status::{StatusWord, common as status},
    };
}
