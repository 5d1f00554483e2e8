//! In-memory implementation of `RunStore`.
//!
//! `InMemoryRunStore` is the reference implementation of the `RunStore`
//! trait.  It keeps all entries in a `Vec` protected by a `Mutex`, making it
//! safe to share across tasks while the engine appends completed runs.
//!
//! Use `export_log()` to obtain a sealed `RunLog` snapshot, and
//! `verify_integrity()` at any time to confirm the chain has not been
//! tampered with in memory.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::info;

use concord_contracts::{
    error::{ConcordError, ConcordResult},
    run::VerificationRun,
};
use concord_core::traits::RunStore;

use crate::{
    chain::{hash_entry, verify_chain},
    entry::{RunLog, RunLogEntry},
};

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of an `InMemoryRunStore`.
///
/// Kept behind `Arc<Mutex<_>>` so that both `InMemoryRunStore` and any
/// clones of the `Arc` can safely observe or export the accumulated entries.
pub(crate) struct InMemoryState {
    /// All entries appended so far, in append order.
    pub(crate) entries: Vec<RunLogEntry>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// The `this_hash` of the last appended entry, or `GENESIS_HASH` before
    /// any entry has been appended.
    pub(crate) last_hash: String,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory, append-only run store backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// `append()` and `get()` both acquire a `Mutex` internally.  Multiple tasks
/// may hold clones of the `Arc<Mutex<InMemoryState>>` without additional
/// synchronization.
pub struct InMemoryRunStore {
    store_id: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRunStore {
    /// Create a new store with the given identifier.
    ///
    /// The internal `last_hash` is initialized to `RunLogEntry::GENESIS_HASH`
    /// so the first entry's `prev_hash` is automatically correct.
    pub fn new(store_id: impl Into<String>) -> Self {
        let store_id = store_id.into();
        let state = InMemoryState {
            entries: Vec::new(),
            sequence: 0,
            last_hash: RunLogEntry::GENESIS_HASH.to_string(),
        };
        Self {
            store_id,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Export a sealed `RunLog` containing all entries appended so far.
    ///
    /// The `terminal_hash` is the `this_hash` of the last entry, or an empty
    /// string when no entries have been appended.
    pub fn export_log(&self) -> RunLog {
        let state = self.state.lock().expect("run store lock poisoned");
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        RunLog {
            store_id: self.store_id.clone(),
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    ///
    /// Delegates to `verify_chain`, which checks both prev-hash linkage and
    /// hash correctness for every entry.
    pub fn verify_integrity(&self) -> bool {
        let state = self.state.lock().expect("run store lock poisoned");
        verify_chain(&state.entries)
    }
}

// ── RunStore impl ─────────────────────────────────────────────────────────────

impl RunStore for InMemoryRunStore {
    /// Append one completed run to the hash chain.
    ///
    /// Computes `this_hash` from (store_id, sequence, prev_hash, run), wraps
    /// the run in a `RunLogEntry`, appends it, then advances the sequence
    /// counter and `last_hash`.
    ///
    /// Returns `Err(RunLogWrite)` if a run with the same `run_id` has
    /// already been appended, or if the internal mutex is poisoned.
    fn append(&self, run: &VerificationRun) -> ConcordResult<()> {
        let mut state = self.state.lock().map_err(|e| ConcordError::RunLogWrite {
            reason: format!("run store lock poisoned: {}", e),
        })?;

        if state.entries.iter().any(|e| e.run.run_id == run.run_id) {
            return Err(ConcordError::RunLogWrite {
                reason: format!("run '{}' already recorded", run.run_id),
            });
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;

        let this_hash = hash_entry(&self.store_id, sequence, run, &prev_hash);

        let entry = RunLogEntry {
            sequence,
            store_id: self.store_id.clone(),
            run: run.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        };

        state.entries.push(entry);
        state.sequence += 1;
        state.last_hash = this_hash.clone();

        info!(
            run_id = %run.run_id,
            sequence = sequence,
            this_hash = %this_hash,
            "verification run recorded"
        );

        Ok(())
    }

    /// Fetch a run by its id, if the store holds one.
    fn get(&self, run_id: &str) -> Option<VerificationRun> {
        let state = self.state.lock().ok()?;
        state
            .entries
            .iter()
            .find(|e| e.run.run_id == run_id)
            .map(|e| e.run.clone())
    }
}
