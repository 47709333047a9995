//! Wallet card operations composed from the codec and a session

use std::sync::Arc;

use bytes::Bytes;
use tapcard_apdu_core::{CardReaderError, Response};
use tapcard_codec::{CommandCodec, FirmwareVersion, VendorSdk};
use tracing::{debug, instrument};

use crate::{CardSession, Radio, Result};

/// Builds commands through the vendor SDK and runs them over a [`CardSession`]
///
/// Every operation checks the status word before the SDK sees the response, so a
/// card failure surfaces as [`SessionError::Card`](crate::SessionError::Card)
/// rather than an SDK rejection.
#[derive(Debug)]
pub struct CardOperations<R> {
    session: Arc<CardSession<R>>,
    codec: CommandCodec,
}

impl<R: Radio> CardOperations<R> {
    /// Allocate a wallet context on `sdk` for use over `session`
    pub fn new(session: Arc<CardSession<R>>, sdk: Arc<dyn VendorSdk>) -> Result<Self> {
        Ok(Self::with_codec(session, CommandCodec::new(sdk)?))
    }

    /// Use an existing codec
    pub const fn with_codec(session: Arc<CardSession<R>>, codec: CommandCodec) -> Self {
        Self { session, codec }
    }

    /// The underlying session
    pub const fn session(&self) -> &Arc<CardSession<R>> {
        &self.session
    }

    /// Select the wallet application `aid`
    #[instrument(level = "debug", skip_all, fields(aid = %hex::encode(aid)))]
    pub async fn select_wallet(&mut self, aid: &[u8]) -> Result<()> {
        let command = self.codec.select_wallet_request(aid)?;
        let response = Self::exchange(&self.session, command).await?;
        self.codec.select_wallet_response(&response)?;
        debug!("Wallet application selected");
        Ok(())
    }

    /// Read the card firmware version
    #[instrument(level = "debug", skip_all)]
    pub async fn firmware_version(&mut self) -> Result<FirmwareVersion> {
        let command = self.codec.firmware_version_request()?;
        let response = Self::exchange(&self.session, command).await?;
        Ok(self.codec.firmware_version_response(&response)?)
    }

    /// Run the first step of the encrypted session handshake
    #[instrument(level = "debug", skip_all)]
    pub async fn init_encrypted_session(&mut self) -> Result<()> {
        let command = self.codec.init_encrypted_session_request()?;
        let response = Self::exchange(&self.session, command).await?;
        self.codec.init_encrypted_session_response(&response)?;
        debug!("Encrypted session initialised");
        Ok(())
    }

    /// Borrows only the session across the await; the wallet context is not `Sync`
    async fn exchange(session: &CardSession<R>, command: Bytes) -> Result<Bytes> {
        let response = session.send_receive(command).await?;
        CardReaderError::check(Response::from_bytes(&response)?.status())?;
        Ok(response)
    }
}
