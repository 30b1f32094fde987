//! # Carebook Domain
//!
//! Patient and address entities. Both are plain data; every invariant is
//! checked by `validate()` before a value reaches a repository.

pub mod address;
pub mod patient;

pub use address::*;
pub use patient::*;

use chrono::{DateTime, SubsecRound, Utc};

/// Returns the current time truncated to millisecond precision.
///
/// The document store keeps milliseconds only, so every server-stamped
/// timestamp is truncated up front and reads back unchanged from either
/// backend.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
