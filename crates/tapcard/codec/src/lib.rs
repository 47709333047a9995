//! Command codec for the wallet card vendor SDK
//!
//! The vendor SDK decides how every command is framed and how every response is
//! interpreted. This crate wraps its raw pointer/length convention so callers only
//! ever see owned [`Bytes`](bytes::Bytes) or a [`CodecError`]:
//!
//! - a null buffer from a builder is a [`CodecError::NullBuffer`] defect, never a
//!   retryable card failure
//! - SDK buffers are copied and released inside the call that produced them
//! - the wallet context lives in a [`WalletHandle`] and is freed on drop
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

mod buffer;
mod codec;
mod error;
mod sdk;
mod wallet;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use codec::{CommandCodec, FirmwareVersion};
pub use error::{CodecError, Result};
pub use sdk::{RawWallet, VendorSdk};
pub use wallet::WalletHandle;
