//! Verification run and risk types.
//!
//! `VerificationRun` is the aggregate root: built once by the report builder,
//! never mutated afterwards. Callers that persist runs must do so as
//! immutable, append-only records keyed by `run_id` (see concord-runlog for
//! the bundled implementation of that contract).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::discrepancy::{Discrepancy, Severity};

/// Discretized bucket of the risk score, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a risk score onto its level.
    ///
    /// The ladder is evaluated top-down, first match wins; boundaries are
    /// inclusive on the lower bound. Callers must pass the *unrounded*
    /// score — a score of 0.79999 is `High` even though it prints as 0.80.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.4 {
            RiskLevel::Moderate
        } else if score >= 0.2 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "minimal"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Per-severity discrepancy counts for the report summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
}

impl VerificationSummary {
    /// Tally severities from a classified discrepancy list.
    pub fn from_discrepancies(discrepancies: &[Discrepancy]) -> Self {
        let mut summary = Self::default();
        for d in discrepancies {
            match d.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Major => summary.major += 1,
                Severity::Minor => summary.minor += 1,
            }
        }
        summary
    }
}

/// One completed verification run — the structured report returned to the
/// caller.
///
/// Invariants (upheld by the aggregator and report builder):
/// - `match_percentage = (total_fields_compared - discrepancies.len()) / total_fields_compared * 100`
///   when `total_fields_compared > 0`, else 100.0.
/// - `risk_level` is the deterministic ladder over the unrounded risk score.
/// - `discrepancies` retain comparator discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRun {
    /// Collision-resistant identifier minted by the report builder.
    pub run_id: String,
    /// The subject whose records were reconciled.
    pub subject_id: String,
    /// Optional visit identifier from the verification request.
    pub visit_id: Option<String>,
    /// UTC timestamp the report was assembled.
    pub verification_date: DateTime<Utc>,
    /// Size of the union of flattened field paths in both records.
    pub total_fields_compared: usize,
    /// All classified discrepancies, in discovery order.
    pub discrepancies: Vec<Discrepancy>,
    /// Percent of compared fields with no discrepancy, one decimal place.
    pub match_percentage: f64,
    /// Aggregate risk in `0.0..=1.0`, two decimal places.
    pub risk_score: f64,
    /// Discretized risk bucket.
    pub risk_level: RiskLevel,
    /// Human-readable strings for critical/major findings.
    pub risk_factors: Vec<String>,
    /// Per-severity counts.
    pub verification_summary: VerificationSummary,
}
