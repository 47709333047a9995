//! Owned vendor wallet context

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use tracing::debug;

use crate::{CodecError, Result, VendorSdk, sdk::RawWallet};

/// Wallet context allocated by the vendor SDK, released on drop
pub struct WalletHandle {
    sdk: Arc<dyn VendorSdk>,
    raw: NonNull<std::ffi::c_void>,
}

// SAFETY: `VendorSdk` allows a wallet to be used from any thread as long as calls on it
// are not concurrent; `WalletHandle` is not `Sync` and only hands out the pointer via `&self`
// to callers that already hold it exclusively (see `CommandCodec`, which takes `&mut self`).
unsafe impl Send for WalletHandle {}

impl WalletHandle {
    /// Allocate a new wallet context
    pub fn new(sdk: Arc<dyn VendorSdk>) -> Result<Self> {
        let raw = NonNull::new(sdk.wallet_init())
            .ok_or(CodecError::NullBuffer { call: "wallet_init" })?;
        debug!("Allocated vendor wallet context");
        Ok(Self { sdk, raw })
    }

    /// SDK this wallet belongs to
    pub fn sdk(&self) -> &dyn VendorSdk {
        self.sdk.as_ref()
    }

    pub(crate) const fn as_raw(&self) -> RawWallet {
        self.raw.as_ptr()
    }
}

impl Drop for WalletHandle {
    fn drop(&mut self) {
        self.sdk.wallet_free(self.raw.as_ptr());
        debug!("Released vendor wallet context");
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}
