//! Opaque identifiers for request and log correlation.
//!
//! Identifiers are shaped like version-4 UUIDs but are NOT suitable where
//! unpredictability is a security requirement.

use rand::Rng;

use crate::time::{Clock, SystemClock};

/// Prefix for trace identifiers.
pub const TRACE_PREFIX: &str = "WebPage_";

/// Length of a formatted identifier.
pub const UUID_LEN: usize = 36;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const HYPHENS: [usize; 4] = [8, 13, 18, 23];
const VERSION_POS: usize = 14;
const VARIANT_POS: usize = 19;

/// Generate an identifier from the thread-local generator.
pub fn uuid() -> String {
    uuid_with(&mut rand::thread_rng())
}

/// Generate an identifier from the given random source.
///
/// Output is 36 lowercase characters: hyphens at 8, 13, 18 and 23, the
/// version nibble fixed at `4`, the variant nibble in `8..=b`.
pub fn uuid_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut out = [0u8; UUID_LEN];
    for slot in out.iter_mut() {
        *slot = HEX_DIGITS[rng.gen_range(0..16)];
    }
    out[VERSION_POS] = b'4';
    out[VARIANT_POS] = HEX_DIGITS[(rng.gen_range(0..16) & 0x3) | 0x8];
    for pos in HYPHENS {
        out[pos] = b'-';
    }
    out.iter().map(|&b| b as char).collect()
}

/// `WebPage_<uuid>_<epoch millis>` using the system clock.
pub fn trace_id() -> String {
    trace_id_at(&SystemClock)
}

/// Trace identifier stamped with an injected clock.
pub fn trace_id_at(clock: &dyn Clock) -> String {
    format!("{TRACE_PREFIX}{}_{}", uuid(), clock.now_millis())
}

/// Return `true` if `s` has the shape produced by [`uuid`].
pub fn is_valid_uuid(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != UUID_LEN {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| {
        if HYPHENS.contains(&i) {
            b == b'-'
        } else if i == VERSION_POS {
            b == b'4'
        } else if i == VARIANT_POS {
            matches!(b, b'8' | b'9' | b'a' | b'b')
        } else {
            HEX_DIGITS.contains(&b)
        }
    })
}
