//! Run log entry and export types.
//!
//! `RunLogEntry` is a single entry in the hash chain — it wraps a completed
//! `VerificationRun` with sequence numbering and the SHA-256 hashes that make
//! tampering detectable.  `RunLog` is the sealed export produced on demand
//! from a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use concord_contracts::run::VerificationRun;

/// A single entry in the SHA-256 hash chain of a run store.
///
/// Each entry commits to the previous entry via `prev_hash`, forming an
/// append-only chain.  Modifying any field — including those of the embedded
/// `run` — invalidates `this_hash` and every subsequent `prev_hash`, which
/// `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    /// Monotonically increasing position in the chain, starting at 0.
    pub sequence: u64,

    /// The store this entry belongs to.
    pub store_id: String,

    /// The immutable verification run produced by the engine.
    pub run: VerificationRun,

    /// SHA-256 hash (hex) of the previous entry, or `GENESIS_HASH` for the
    /// first entry.
    pub prev_hash: String,

    /// SHA-256 hash (hex) of this entry's canonical content.
    ///
    /// Computed by `hash_entry()` over (store_id, sequence, prev_hash,
    /// canonical JSON of run).
    pub this_hash: String,
}

impl RunLogEntry {
    /// The sentinel `prev_hash` used for the first entry in every chain.
    ///
    /// 64 hex zeros — a value that can never be the SHA-256 of real data,
    /// making genesis detection unambiguous.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed snapshot of a run store's chain.
///
/// Produced by `InMemoryRunStore::export_log()`.  The `terminal_hash` is the
/// `this_hash` of the last entry and can be used as a compact commitment to
/// the entire log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    /// The store whose runs are recorded here.
    pub store_id: String,

    /// All entries in chain order (sequence 0 first).
    pub entries: Vec<RunLogEntry>,

    /// Wall-clock time (UTC) the log was exported.
    pub exported_at: DateTime<Utc>,

    /// The `this_hash` of the last entry.  Empty string if the log is empty.
    pub terminal_hash: String,
}
