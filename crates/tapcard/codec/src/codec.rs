//! Request builders and response parsers of the wallet card application

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tapcard_apdu_core::utils::read_length_prefixed;
use tracing::{debug, warn};

use crate::buffer::take_owned;
use crate::{CodecError, Result, VendorSdk, WalletHandle};

/// Firmware version reported by the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Patch version
    pub patch: u8,
    /// Build number
    pub build: u8,
}

impl FirmwareVersion {
    /// Parse the length-prefixed version field produced by the SDK
    pub fn from_field(
        buffer: &[u8],
    ) -> std::result::Result<Self, tapcard_apdu_core::ResponseError> {
        let (field, _) = read_length_prefixed(buffer)?;
        let [major, minor, patch, build] = field else {
            return Err(tapcard_apdu_core::ResponseError::parse(
                "firmware version must be 4 bytes",
            ));
        };
        Ok(Self {
            major: *major,
            minor: *minor,
            patch: *patch,
            build: *build,
        })
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

/// Owned-buffer facade over the vendor SDK for one wallet context
///
/// Every method takes `&mut self`: the SDK forbids concurrent calls on one wallet.
#[derive(Debug)]
pub struct CommandCodec {
    wallet: WalletHandle,
}

impl CommandCodec {
    /// Allocate a wallet context on `sdk`
    pub fn new(sdk: Arc<dyn VendorSdk>) -> Result<Self> {
        Ok(Self {
            wallet: WalletHandle::new(sdk)?,
        })
    }

    /// Wrap an already allocated wallet context
    pub const fn from_wallet(wallet: WalletHandle) -> Self {
        Self { wallet }
    }

    /// Build the SELECT command for the wallet application `aid`
    pub fn select_wallet_request(&mut self, aid: &[u8]) -> Result<Bytes> {
        let (sdk, wallet) = (self.wallet.sdk(), self.wallet.as_raw());
        take_owned(sdk, "select_wallet_request", |len| {
            sdk.select_wallet_request(wallet, aid, len)
        })
    }

    /// Parse the SELECT response
    pub fn select_wallet_response(&mut self, response: &[u8]) -> Result<()> {
        let code = self
            .wallet
            .sdk()
            .select_wallet_response(self.wallet.as_raw(), response);
        check_code("select_wallet_response", code)
    }

    /// Build the GET FIRMWARE VERSION command
    pub fn firmware_version_request(&mut self) -> Result<Bytes> {
        let (sdk, wallet) = (self.wallet.sdk(), self.wallet.as_raw());
        take_owned(sdk, "get_firmware_version_request", |len| {
            sdk.get_firmware_version_request(wallet, len)
        })
    }

    /// Parse the GET FIRMWARE VERSION response
    pub fn firmware_version_response(&mut self, response: &[u8]) -> Result<FirmwareVersion> {
        const CALL: &str = "get_firmware_version_response";
        let (sdk, wallet) = (self.wallet.sdk(), self.wallet.as_raw());
        let field = take_owned(sdk, CALL, |len| {
            sdk.get_firmware_version_response(wallet, response, len)
        })?;
        let version = FirmwareVersion::from_field(&field)
            .map_err(|source| CodecError::Malformed { call: CALL, source })?;
        debug!(%version, "Parsed firmware version");
        Ok(version)
    }

    /// Build the first command of the encrypted session handshake
    pub fn init_encrypted_session_request(&mut self) -> Result<Bytes> {
        let (sdk, wallet) = (self.wallet.sdk(), self.wallet.as_raw());
        take_owned(sdk, "init_encrypted_session_request", |len| {
            sdk.init_encrypted_session_request(wallet, len)
        })
    }

    /// Parse the encrypted session handshake response
    pub fn init_encrypted_session_response(&mut self, response: &[u8]) -> Result<()> {
        let code = self
            .wallet
            .sdk()
            .init_encrypted_session_response(self.wallet.as_raw(), response);
        check_code("init_encrypted_session_response", code)
    }
}

fn check_code(call: &'static str, code: i32) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        warn!(call, code, "Vendor SDK rejected response");
        Err(CodecError::Rejected { call, code })
    }
}
