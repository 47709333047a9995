//! Call contract of the card vendor SDK
//!
//! The vendor SDK builds every outbound APDU itself and parses every response.
//! Its builders follow one convention: the caller passes an output-length slot,
//! the SDK returns a pointer to a buffer of that many bytes, or null on failure.
//! Those buffers belong to the SDK until handed back through
//! [`VendorSdk::free_buffer`].

use std::ffi::c_void;
use std::fmt;

/// Raw wallet context pointer as returned by `wallet_init`
pub type RawWallet = *mut c_void;

/// Binding to the vendor card SDK
///
/// # Safety
///
/// Implementors guarantee that:
/// - every non-null pointer returned by a builder or by a parser that fills an
///   output-length slot points to at least `*len` initialized bytes, which stay
///   valid until passed to [`free_buffer`](Self::free_buffer);
/// - a wallet returned by [`wallet_init`](Self::wallet_init) stays valid until
///   passed to [`wallet_free`](Self::wallet_free), and may be used from any
///   thread as long as calls on it are not concurrent.
pub unsafe trait VendorSdk: Send + Sync + fmt::Debug {
    /// Allocate a wallet context, null on failure
    fn wallet_init(&self) -> RawWallet;

    /// Release a wallet context
    fn wallet_free(&self, wallet: RawWallet);

    /// Build the SELECT command for the wallet application `aid`
    fn select_wallet_request(&self, wallet: RawWallet, aid: &[u8], len: &mut usize) -> *mut u8;

    /// Parse the SELECT response, returning 0 on success
    fn select_wallet_response(&self, wallet: RawWallet, response: &[u8]) -> i32;

    /// Build the GET FIRMWARE VERSION command
    fn get_firmware_version_request(&self, wallet: RawWallet, len: &mut usize) -> *mut u8;

    /// Parse the GET FIRMWARE VERSION response into a length-prefixed version field
    fn get_firmware_version_response(
        &self,
        wallet: RawWallet,
        response: &[u8],
        len: &mut usize,
    ) -> *mut u8;

    /// Build the first command of the encrypted session handshake
    fn init_encrypted_session_request(&self, wallet: RawWallet, len: &mut usize) -> *mut u8;

    /// Parse the encrypted session handshake response, returning 0 on success
    fn init_encrypted_session_response(&self, wallet: RawWallet, response: &[u8]) -> i32;

    /// Hand a buffer returned by this SDK back to it
    ///
    /// # Safety
    ///
    /// `buffer` and `len` must be exactly a pointer/length pair previously
    /// returned by this SDK and not yet freed.
    unsafe fn free_buffer(&self, buffer: *mut u8, len: usize);
}
