//! Error types for the CONCORD reconciliation pipeline.
//!
//! All fallible operations in the pipeline return `ConcordResult<T>`.
//! Only two variants are fatal to a verification run: `MalformedRecord`
//! (the input cannot be flattened) and `InvalidPolicy` (caught at
//! configuration load, never mid-run). Every other failure is isolated to a
//! single field and surfaces in that discrepancy's rationale.

use thiserror::Error;

/// The unified error type for the CONCORD engine.
#[derive(Debug, Error)]
pub enum ConcordError {
    /// The input record cannot be safely flattened.
    ///
    /// Fatal to the run — no partial report is produced.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// No known conversion exists between the two units of a quantity field.
    ///
    /// Localized: the comparator downgrades the field to a `unit_mismatch`
    /// discrepancy instead of aborting the run.
    #[error("no unit conversion from '{from}' to '{to}' for field '{field}'")]
    UnsupportedUnitConversion {
        field: String,
        from: String,
        to: String,
    },

    /// An external classifier call did not answer within its deadline.
    ///
    /// Localized: the engine substitutes the deterministic fallback for the
    /// single affected discrepancy.
    #[error("classification timed out for field '{field}'")]
    ClassificationTimeout { field: String },

    /// An external classifier call failed outright.
    ///
    /// Localized, handled identically to a timeout.
    #[error("classification service error for field '{field}': {reason}")]
    ClassificationService { field: String, reason: String },

    /// The tolerance/severity/scoring policy tables are malformed.
    ///
    /// Raised at configuration load time only — a policy that passes
    /// validation never fails during a run.
    #[error("invalid comparison policy: {reason}")]
    InvalidPolicy { reason: String },

    /// The run log could not persist a completed run.
    #[error("run log write failed: {reason}")]
    RunLogWrite { reason: String },
}

/// Convenience alias used throughout the CONCORD crates.
pub type ConcordResult<T> = Result<T, ConcordError>;
