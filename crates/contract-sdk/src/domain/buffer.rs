//! # Buffer Protocol
//!
//! Query-then-fetch convention shared by every variable-length host call.
//!
//! The destination slice length is the capacity:
//!
//! - capacity `0`: nothing is written, the required length `L` is returned;
//! - capacity `c > 0`: `min(c, L)` bytes are written and that count is
//!   returned.
//!
//! A returned count equal to the supplied capacity may mean truncation, so
//! guests always query first and fetch into a buffer of exactly `L` bytes.

use crate::errors::{CodecError, ContractError};

/// Host side: serves `value` into `dst` following the convention.
pub fn serve(value: &[u8], dst: &mut [u8]) -> usize {
    if dst.is_empty() {
        return value.len();
    }
    let n = dst.len().min(value.len());
    dst[..n].copy_from_slice(&value[..n]);
    n
}

/// Whether a fetch that wrote `written` bytes into `capacity` may be cut short.
#[must_use]
pub fn is_possibly_truncated(written: usize, capacity: usize) -> bool {
    capacity > 0 && written == capacity
}

/// Guest side: queries the length, allocates, then fetches.
///
/// `read` is one host call applied to a destination buffer.
pub fn fetch<F>(read: F) -> Result<Vec<u8>, ContractError>
where
    F: Fn(&mut [u8]) -> usize,
{
    let required = read(&mut [0u8; 0][..]);
    if required == 0 {
        return Ok(Vec::new());
    }
    let mut buf = vec![0u8; required];
    let written = read(buf.as_mut_slice());
    if written != required {
        return Err(ContractError::HostFault(format!(
            "host announced {required} bytes but wrote {written}"
        )));
    }
    Ok(buf)
}

/// Fetches a UTF-8 string value.
pub fn fetch_string<F>(read: F) -> Result<String, ContractError>
where
    F: Fn(&mut [u8]) -> usize,
{
    String::from_utf8(fetch(read)?).map_err(|_| CodecError::InvalidUtf8.into())
}

// =============================================================================
// TESTS
// =============================================================================
