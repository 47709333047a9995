//! Detected contactless tags

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use derive_more::Display;

use crate::TransportError;

/// Protocol family a detected tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TagFamily {
    /// ISO 7816 APDUs over ISO-DEP, the only family wallet cards use
    #[display("ISO 7816")]
    Iso7816,
    /// ISO 15693 vicinity tags
    #[display("ISO 15693")]
    Iso15693,
    /// FeliCa tags
    #[display("FeliCa")]
    FeliCa,
    /// MIFARE tags
    #[display("MIFARE")]
    Mifare,
}

/// A tag reported by the platform radio
#[async_trait]
pub trait Tag: Send + Sync + fmt::Debug {
    /// Protocol family of the tag
    fn family(&self) -> TagFamily;

    /// Application identifier the platform selected on detection, as hex
    fn selected_aid(&self) -> Option<&str>;

    /// Send one APDU and wait for the card's answer
    async fn transmit(&self, command: Bytes) -> Result<Bytes, TransportError>;
}

/// Shared handle to a detected tag
pub type TagHandle = Arc<dyn Tag>;
