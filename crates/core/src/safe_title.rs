//! Safe-title derivation for a run's output location.
//!
//! A safe title is the path segment used both under the storage root and in
//! the public viewer URL. It contains only ASCII digits, lowercase hex, `_`
//! and fixed ASCII prefixes, so it never needs escaping.
//!
//! Two derivations exist:
//!
//! - [`resolve`]: `"<YYYYMMDD_HHMMSS>_<hash8>"`, where the timestamp is the
//!   run's start time rendered in a fixed offset and `hash8` is taken from
//!   SHA-256 over the title and the start time at nanosecond precision.
//!   Sortable by creation time, but different on every redelivery.
//! - [`resolve_keyed`]: `"idem_<hash16>"`, from SHA-256 over the title and
//!   an enqueue-time idempotency key. Identical across redeliveries.

use chrono::{FixedOffset, Offset, SecondsFormat, Utc};

use crate::hashing::sha256_prefix;
use crate::types::Timestamp;

/// Offset used when none is configured or the configured one is invalid (UTC+9).
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 9 * 3600;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const HASH_LEN: usize = 8;
const KEYED_HASH_LEN: usize = 16;
const KEYED_PREFIX: &str = "idem_";

/// The fallback offset, UTC+9.
pub fn default_offset() -> FixedOffset {
    match FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS) {
        Some(offset) => offset,
        None => unreachable!("UTC+9 is within the valid offset range"),
    }
}

/// Parse an offset such as `"+09:00"`, `"-0530"`, `"Z"` or `"UTC"`.
///
/// Anything unparseable falls back to [`default_offset`] instead of failing.
pub fn parse_utc_offset(raw: &str) -> FixedOffset {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Utc.fix();
    }
    raw.parse::<FixedOffset>().unwrap_or_else(|_| default_offset())
}

/// Derive the time-salted safe title for a run that started at `start`.
pub fn resolve(title: &str, start: Timestamp, offset: FixedOffset) -> String {
    let stamp = start.with_timezone(&offset).format(TIMESTAMP_FORMAT);
    let salt = start.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let hash = sha256_prefix(format!("{title}{salt}").as_bytes(), HASH_LEN);
    format!("{stamp}_{hash}")
}

/// Derive the redelivery-stable safe title from an idempotency key.
pub fn resolve_keyed(title: &str, idempotency_key: &str) -> String {
    let hash = sha256_prefix(format!("{title}\n{idempotency_key}").as_bytes(), KEYED_HASH_LEN);
    format!("{KEYED_PREFIX}{hash}")
}
