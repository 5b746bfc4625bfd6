//! Shared SHA-256 hex digest utility.
//!
//! Used by the safe-title resolver for both the time-salted and the
//! idempotency-keyed identifiers.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// First `len` hex characters of the SHA-256 digest of `data`.
///
/// `len` is clamped to the full digest length (64).
pub fn sha256_prefix(data: &[u8], len: usize) -> String {
    let mut hex = sha256_hex(data);
    hex.truncate(len.min(64));
    hex
}
