//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! The chain is built by concatenating deterministic byte sequences and
//! feeding them into SHA-256.  Every field that contributes to an entry's
//! hash is listed explicitly so nothing is accidentally omitted.
//!
//! Hash input layout (bytes, in order):
//!   1. store_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of run (serde_json with no pretty-printing)

use sha2::{Digest, Sha256};

use concord_contracts::run::VerificationRun;

use crate::entry::RunLogEntry;

/// Compute the SHA-256 hash for a single run log entry.
///
/// The hash commits to every field that uniquely identifies an entry: its
/// position in the chain (`sequence`), the store it belongs to (`store_id`),
/// its link to the previous entry (`prev_hash`), and the full run.
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if `run` cannot be serialized to JSON — which cannot happen for
/// the well-formed `VerificationRun` type.
pub fn hash_entry(store_id: &str, sequence: u64, run: &VerificationRun, prev_hash: &str) -> String {
    // serde_json::to_vec produces canonical, deterministic JSON without
    // trailing whitespace or key reordering across calls on the same value.
    let run_json =
        serde_json::to_vec(run).expect("VerificationRun must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(store_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&run_json);

    hex::encode(hasher.finalize())
}

/// Verify the integrity of a hash chain.
///
/// Returns `true` when the chain is valid according to both rules:
///
/// 1. **Prev-hash linkage** — each entry's `prev_hash` equals the
///    `this_hash` of the preceding entry (or `GENESIS_HASH` for entry 0).
/// 2. **Hash correctness** — each entry's `this_hash` matches the value
///    recomputed from its own fields.
///
/// Returns `false` the moment any mismatch is detected.  An empty chain is
/// defined as valid.
pub fn verify_chain(entries: &[RunLogEntry]) -> bool {
    let mut expected_prev = RunLogEntry::GENESIS_HASH.to_string();

    for entry in entries {
        // Rule 1: the stored prev_hash must match what we expect.
        if entry.prev_hash != expected_prev {
            return false;
        }

        // Rule 2: recompute this_hash and compare to the stored value.
        let recomputed = hash_entry(&entry.store_id, entry.sequence, &entry.run, &entry.prev_hash);
        if entry.this_hash != recomputed {
            return false;
        }

        // Advance the expected prev_hash to this entry's hash.
        expected_prev = entry.this_hash.clone();
    }

    true
}
