//! Core trait definitions for the CONCORD reconciliation pipeline.
//!
//! Two seams exist:
//!
//! - `SeverityClassifier` — judges the clinical significance of one
//!   discrepancy. The bundled rule-based implementation is deterministic;
//!   an external reasoning delegate (LLM service, rules database, human
//!   reviewer queue) can be substituted without touching engine internals.
//! - `RunStore`        — append-only persistence of completed runs.
//!
//! The engine wires them together; everything between flatten and aggregate
//! is pure and lives outside any trait.

use async_trait::async_trait;

use concord_contracts::{
    discrepancy::{Classification, DiscrepancyContext},
    error::ConcordResult,
    run::VerificationRun,
};

/// Judges the clinical significance of a single discrepancy.
///
/// Implementations may suspend (the external delegate is I/O-bound), but
/// must never let non-determinism leak past the returned `Classification` —
/// the aggregator downstream is a pure function of classifier output.
///
/// A well-formed context must never produce an `Err`: implementations
/// degrade to minor severity with confidence 0.0 instead of failing the run.
/// `Err` is reserved for transport-level failures of external delegates,
/// which the engine isolates to the single affected field.
#[async_trait]
pub trait SeverityClassifier: Send + Sync {
    /// Classify one discrepancy.
    async fn classify(&self, ctx: &DiscrepancyContext) -> ConcordResult<Classification>;
}

/// Append-only persistence of completed verification runs.
///
/// Runs are immutable once handed to the caller; a store must reject any
/// attempt to append a second run under an existing `run_id`.
pub trait RunStore: Send + Sync {
    /// Append one completed run.
    ///
    /// Returns `ConcordError::RunLogWrite` if the run cannot be persisted,
    /// including the duplicate-id case.
    fn append(&self, run: &VerificationRun) -> ConcordResult<()>;

    /// Fetch a run by its id, if the store holds one.
    fn get(&self, run_id: &str) -> Option<VerificationRun>;
}
