//! Document number generation
//!
//! Numbers look like `INV-482913`: the type prefix plus the last six digits
//! of the Unix-millisecond clock. Within one process the millisecond value
//! used is strictly increasing, so two drafts created back to back never get
//! the same number. Across processes collisions remain possible; the number
//! is a display label, the draft `id` is the real key.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::models::DocumentType;

/// Number of digits in the time-derived suffix
pub const SUFFIX_DIGITS: u32 = 6;

const SUFFIX_MODULUS: u64 = 10u64.pow(SUFFIX_DIGITS);

/// Highest millisecond value handed out so far in this process
static WATERMARK: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh document number for `kind` from the current time
pub fn next_number(kind: DocumentType) -> String {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    format_number(kind, suffix_for(claim_millis(now)))
}

/// Reserve a millisecond value that is at least `now` and greater than any
/// value reserved before
fn claim_millis(now: u64) -> u64 {
    let mut current = WATERMARK.load(Ordering::Relaxed);
    loop {
        let next = now.max(current + 1);
        match WATERMARK.compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(actual) => current = actual,
        }
    }
}

/// Last six digits of a millisecond timestamp
pub fn suffix_for(millis: u64) -> u32 {
    (millis % SUFFIX_MODULUS) as u32
}

/// Render `<PREFIX>-<suffix>` with the suffix zero-padded to six digits
pub fn format_number(kind: DocumentType, suffix: u32) -> String {
    format!(
        "{}-{:0width$}",
        kind.prefix(),
        suffix,
        width = SUFFIX_DIGITS as usize
    )
}
