//! Content-derived identifiers
//!
//! The source in this design does not expose stable native ids to the
//! scraper, so dedup keys are derived from the item text itself. Two items
//! with identical text collapse to the same identifier on purpose.

use sha2::{Digest, Sha256};

/// Compute the dedup identifier for an item's text.
///
/// Deterministic: no randomness, no wall clock. SHA-256 over the UTF-8 bytes,
/// rendered as lowercase hex.
pub fn identifier(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}
