//! Conversion of SDK-owned buffers into owned bytes

use std::slice;

use bytes::Bytes;
use tracing::{error, trace};

use crate::{CodecError, Result, VendorSdk};

/// Run an SDK builder and copy its output into an owned buffer
///
/// The SDK buffer is released before returning, so no native pointer outlives the call.
pub(crate) fn take_owned<F>(sdk: &dyn VendorSdk, call: &'static str, build: F) -> Result<Bytes>
where
    F: FnOnce(&mut usize) -> *mut u8,
{
    let mut len = 0usize;
    let ptr = build(&mut len);
    if ptr.is_null() {
        error!(call, "Vendor SDK returned a null buffer");
        return Err(CodecError::NullBuffer { call });
    }

    // SAFETY: `VendorSdk` guarantees a non-null result points to `len` initialized bytes
    // that stay valid until freed.
    let owned = Bytes::copy_from_slice(unsafe { slice::from_raw_parts(ptr, len) });
    // SAFETY: `ptr` and `len` were returned by this SDK just above and are freed exactly once.
    unsafe { sdk.free_buffer(ptr, len) };

    trace!(call, buffer = %hex::encode(&owned), "Copied SDK buffer");
    Ok(owned)
}
