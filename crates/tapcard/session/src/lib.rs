//! Contactless session driver for hardware wallet cards
//!
//! A [`CardSession`] owns the platform [`Radio`] for the lifetime of one user
//! interaction. It bridges the radio's push notifications into channels, picks the
//! wallet card out of the detected tags, and serializes every APDU exchange with it,
//! renewing or restarting the connection when it grows old.
//!
//! ## Overview
//!
//! - [`event`]: the bridge between radio callbacks and the session
//! - [`TagValidator`]: protocol and AID filtering, connection and acknowledgment
//! - [`CardSession`]: start, end, exchange and chained exchange
//! - [`CardOperations`]: wallet commands built by the vendor SDK codec
//!
//! ```ignore
//! let session = Arc::new(CardSession::new(radio));
//! session.start_session(Purpose::IdentifyingCard).await?;
//! let response = session.send_receive(command).await;
//! session.end_session(response.as_ref().err()).await;
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

mod error;
pub mod event;
mod operations;
mod policy;
mod purpose;
mod radio;
mod session;
mod tag;
mod validator;

pub use error::{InvalidationReason, Result, SessionError, TransportError};
pub use event::{EventSink, SessionEvents};
pub use operations::CardOperations;
pub use policy::{Clock, Freshness, SessionPolicy, TokioClock};
pub use purpose::{CardDescriptor, Purpose};
pub use radio::Radio;
pub use session::{CardSession, Phase, SessionSnapshot};
pub use tag::{Tag, TagFamily, TagHandle};
pub use validator::{ARCULUS_AID, TagValidator};
