//! # concord-runlog
//!
//! Immutable, append-only, SHA-256 hash-chained store of completed CONCORD
//! verification runs.
//!
//! ## Overview
//!
//! Every run the engine produces is wrapped in a `RunLogEntry` that links to
//! the previous entry via its SHA-256 hash.  Tampering with any entry — even
//! a single byte of the embedded run — breaks the chain and is detected by
//! `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use concord_runlog::InMemoryRunStore;
//! use concord_core::traits::RunStore;
//!
//! let store = InMemoryRunStore::new("site-042");
//! store.append(&run)?;
//!
//! assert!(store.verify_integrity());
//! let log = store.export_log();
//! ```

pub mod chain;
pub mod entry;
pub mod memory;

pub use chain::{hash_entry, verify_chain};
pub use entry::{RunLog, RunLogEntry};
pub use memory::InMemoryRunStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
