//! # concord-core
//!
//! The deterministic reconciliation pipeline for CONCORD:
//!
//! - [`flatten`](flatten::flatten) — nested records → flat field sets
//! - [`compare`](compare::compare) — type-aware, policy-driven diffing
//! - [`traits::SeverityClassifier`] — the pluggable clinical-judgment seam
//! - [`aggregate`](aggregate::aggregate) — pure scoring over classified
//!   discrepancies
//! - [`report`](report::build_report) — assembles the frozen
//!   `VerificationRun`
//! - [`VerificationEngine`] — wires the stages with bounded classifier
//!   fan-out, per-call deadlines, and deterministic fallback
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use concord_core::{VerificationEngine, VerificationRequest};
//!
//! let engine = VerificationEngine::new(policy, delegate, Arc::new(rule_based))?;
//! let run = engine.verify(&request).await?;
//! ```

pub mod aggregate;
pub mod compare;
pub mod engine;
pub mod flatten;
pub mod report;
pub mod traits;

pub use engine::{ClassifierLimits, VerificationEngine, VerificationRequest};
