//! APDU response definitions
//!
//! A response is the card's answer to one command: optional payload followed
//! by exactly two status bytes.

pub mod status;
pub mod utils;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{CardReaderError, ResponseError};
use status::StatusWord;

/// A card's answer to one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data, empty when the card answered with a bare status word
    payload: Bytes,
    status: StatusWord,
}

impl Response {
    /// Response from its parts
    pub fn new(payload: Bytes, status: impl Into<StatusWord>) -> Self {
        Self {
            payload,
            status: status.into(),
        }
    }

    /// `payload` followed by `90 00`
    pub const fn success(payload: Bytes) -> Self {
        Self {
            payload,
            status: status::common::SUCCESS,
        }
    }

    /// Bare status word without payload
    pub fn error(status: impl Into<StatusWord>) -> Self {
        Self {
            payload: Bytes::new(),
            status: status.into(),
        }
    }

    /// Split a raw response into payload and status word, sharing `data`'s buffer
    pub fn from_bytes(data: &Bytes) -> Result<Self, ResponseError> {
        let (status, payload) = utils::extract_status_and_payload(data)?;
        let payload = data.slice_ref(payload);

        trace!(
            sw1 = format_args!("{:#04x}", status.sw1),
            sw2 = format_args!("{:#04x}", status.sw2),
            payload_len = payload.len(),
            "Split response"
        );

        Ok(Self { payload, status })
    }

    /// Payload without the status word
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Trailing status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Whether the status word is `90 00`
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Convert into the payload, mapping a non-success status word onto a [`CardReaderError`]
    pub fn into_payload(self) -> Result<Bytes, CardReaderError> {
        CardReaderError::check(self.status)?;
        Ok(self.payload)
    }

    /// Serialize back to the wire representation (payload followed by SW1 SW2)
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.payload.len() + 2);
        buf.put_slice(&self.payload);
        buf.put_u8(self.status.sw1);
        buf.put_u8(self.status.sw2);
        buf.freeze()
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = ResponseError;

    fn try_from(data: &[u8]) -> Result<Self, ResponseError> {
        Self::from_bytes(&Bytes::copy_from_slice(data))
    }
}

impl TryFrom<Bytes> for Response {
    type Error = ResponseError;

    fn try_from(data: Bytes) -> Result<Self, ResponseError> {
        Self::from_bytes(&data)
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        response.to_bytes()
    }
}
