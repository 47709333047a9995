//! In-memory vendor SDK for tests

use std::collections::HashSet;
use std::ffi::c_void;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tapcard_apdu_core::Command;

use crate::VendorSdk;
use crate::sdk::RawWallet;

/// Vendor SDK stand-in that frames plain ISO 7816 commands and tracks its allocations
#[derive(Debug, Default)]
pub struct MockSdk {
    live_wallets: AtomicUsize,
    outstanding_buffers: AtomicUsize,
    failing: Mutex<HashSet<&'static str>>,
}

impl MockSdk {
    /// Command returned by `get_firmware_version_request`
    pub const FIRMWARE_VERSION_APDU: &'static [u8] = &[0x80, 0xF1, 0x00, 0x00, 0x00];
    /// Command returned by `init_encrypted_session_request`
    pub const INIT_SESSION_APDU: &'static [u8] = &[0x80, 0x50, 0x00, 0x00, 0x00];
    /// Code returned by parsers for a non-success response
    pub const REJECTED: i32 = 3;

    /// Create a new mock SDK
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named entry point return null from now on
    pub fn fail_call(&self, call: &'static str) {
        self.failing.lock().insert(call);
    }

    /// Number of wallet contexts allocated and not yet freed
    pub fn live_wallets(&self) -> usize {
        self.live_wallets.load(Ordering::SeqCst)
    }

    /// Number of buffers handed out and not yet freed
    pub fn outstanding_buffers(&self) -> usize {
        self.outstanding_buffers.load(Ordering::SeqCst)
    }

    fn fails(&self, call: &'static str) -> bool {
        self.failing.lock().contains(call)
    }

    fn hand_out(&self, call: &'static str, bytes: Vec<u8>, len: &mut usize) -> *mut u8 {
        if self.fails(call) {
            return ptr::null_mut();
        }
        let boxed = bytes.into_boxed_slice();
        *len = boxed.len();
        self.outstanding_buffers.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(boxed).cast::<u8>()
    }
}

fn is_success(response: &[u8]) -> bool {
    response.ends_with(&[0x90, 0x00])
}

fn payload(response: &[u8]) -> &[u8] {
    &response[..response.len().saturating_sub(2)]
}

// SAFETY: every buffer comes from `Box<[u8]>::into_raw` with `*len` set to its length and
// is only released by `free_buffer`; wallets are dangling sentinels that are never dereferenced.
unsafe impl VendorSdk for MockSdk {
    fn wallet_init(&self) -> RawWallet {
        if self.fails("wallet_init") {
            return ptr::null_mut();
        }
        self.live_wallets.fetch_add(1, Ordering::SeqCst);
        NonNull::<c_void>::dangling().as_ptr()
    }

    fn wallet_free(&self, _wallet: RawWallet) {
        self.live_wallets.fetch_sub(1, Ordering::SeqCst);
    }

    fn select_wallet_request(&self, _wallet: RawWallet, aid: &[u8], len: &mut usize) -> *mut u8 {
        let select = Command::new(0x00, 0xA4, 0x04, 0x00).with_data(aid.to_vec());
        match select.to_bytes() {
            Ok(apdu) => self.hand_out("select_wallet_request", apdu.to_vec(), len),
            Err(_) => ptr::null_mut(),
        }
    }

    fn select_wallet_response(&self, _wallet: RawWallet, response: &[u8]) -> i32 {
        if is_success(response) {
            0
        } else {
            Self::REJECTED
        }
    }

    fn get_firmware_version_request(&self, _wallet: RawWallet, len: &mut usize) -> *mut u8 {
        self.hand_out(
            "get_firmware_version_request",
            Self::FIRMWARE_VERSION_APDU.to_vec(),
            len,
        )
    }

    fn get_firmware_version_response(
        &self,
        _wallet: RawWallet,
        response: &[u8],
        len: &mut usize,
    ) -> *mut u8 {
        if !is_success(response) {
            return ptr::null_mut();
        }
        let version = payload(response);
        let mut field = vec![version.len() as u8];
        field.extend_from_slice(version);
        self.hand_out("get_firmware_version_response", field, len)
    }

    fn init_encrypted_session_request(&self, _wallet: RawWallet, len: &mut usize) -> *mut u8 {
        self.hand_out(
            "init_encrypted_session_request",
            Self::INIT_SESSION_APDU.to_vec(),
            len,
        )
    }

    fn init_encrypted_session_response(&self, _wallet: RawWallet, response: &[u8]) -> i32 {
        if is_success(response) {
            0
        } else {
            Self::REJECTED
        }
    }

    unsafe fn free_buffer(&self, buffer: *mut u8, len: usize) {
        // SAFETY: the caller passes back a pointer/length pair produced by `hand_out`.
        drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(buffer, len)) });
        self.outstanding_buffers.fetch_sub(1, Ordering::SeqCst);
    }
}
