//! # Document ID Generator
//!
//! Human-readable, type-prefixed document identifiers.
//!
//! ## Format
//! ```text
//!   INV  2026  A3F0  123456
//!   ───  ────  ────  ──────
//!    │     │     │      └── last 6 digits of the epoch-millisecond clock
//!    │     │     └───────── 4 random uppercase hex chars
//!    │     └─────────────── current year
//!    └───────────────────── Q / INV / REC
//! ```
//!
//! IDs are practically unique, not collision-proof. The database enforces a
//! unique constraint and the creator regenerates on conflict.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

use crate::types::DocumentKind;

/// Generates a new ID for a document of `kind` using the system clock.
pub fn generate_document_id(kind: DocumentKind) -> String {
    generate_document_id_with(kind, Utc::now(), &mut rand::thread_rng())
}

/// Generates an ID from an explicit clock reading and random source.
pub fn generate_document_id_with<R: Rng + ?Sized>(
    kind: DocumentKind,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let random: u16 = rng.gen();
    let millis = now.timestamp_millis().rem_euclid(1_000_000);

    format!(
        "{}{:04}{:04X}{:06}",
        kind.id_prefix(),
        now.year(),
        random,
        millis
    )
}

/// Checks an ID against the format contract for `kind`:
/// `^(Q|INV|REC)\d{4}[0-9A-F]{4}\d{6}$` with the kind's own prefix.
pub fn is_valid_document_id(kind: DocumentKind, id: &str) -> bool {
    let Some(rest) = id.strip_prefix(kind.id_prefix()) else {
        return false;
    };
    let bytes = rest.as_bytes();
    if bytes.len() != 14 {
        return false;
    }

    let (year, tail) = bytes.split_at(4);
    let (hex, millis) = tail.split_at(4);

    year.iter().all(u8::is_ascii_digit)
        && hex
            .iter()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b))
        && millis.iter().all(u8::is_ascii_digit)
}

// =============================================================================
// Unit Tests
// =============================================================================
