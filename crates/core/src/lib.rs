//! Domain types for the mangaka content pipeline.
//!
//! Pure data and derivations with no I/O: task payloads and the closed
//! [`payload::Command`] type, generation results, notification requests,
//! safe-title derivation, and path joining.

pub mod error;
pub mod hashing;
pub mod manga;
pub mod notification;
pub mod paths;
pub mod payload;
pub mod safe_title;
pub mod types;
