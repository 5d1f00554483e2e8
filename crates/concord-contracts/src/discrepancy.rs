//! Discrepancy and classification types.
//!
//! The comparator emits `RawDiscrepancy` values (no clinical judgment yet).
//! Each raw discrepancy is handed to a severity classifier as a
//! `DiscrepancyContext` and the resulting `Classification` is merged into the
//! final report-shape `Discrepancy` by the report builder.

use serde::{Deserialize, Serialize};

use crate::record::FieldValue;

/// How the two records disagree on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyType {
    /// Both records carry the field with differing values.
    ValueMismatch,
    /// The field appears only in the candidate record.
    MissingInReference,
    /// The field appears only in the reference record.
    MissingInCandidate,
    /// Both records carry a quantity but no unit conversion is known.
    UnitMismatch,
}

/// Clinical significance of a discrepancy.
///
/// Variants are declared in ascending order so the derived `Ord` ranks
/// `Critical` highest — the aggregator sorts risk factors by descending
/// severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A field-level mismatch detected by the comparator, before any severity
/// classification has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDiscrepancy {
    /// Flattened field path.
    pub field: String,
    /// Value in the reference record, absent for `MissingInReference`.
    pub reference: Option<FieldValue>,
    /// Value in the candidate record, absent for `MissingInCandidate`.
    pub candidate: Option<FieldValue>,
    /// The kind of disagreement.
    pub kind: DiscrepancyType,
    /// Comparator-supplied detail, e.g. the failed unit conversion text.
    pub note: Option<String>,
}

/// Optional domain knowledge attached to a classification request.
///
/// Resolved by the engine from the severity policy so external classifier
/// delegates receive the same context the rule-based fallback uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainHints {
    /// Inclusive physiological/safety range for numeric fields.
    pub normal_range: Option<[f64; 2]>,
    /// Field category, e.g. `"vital_sign"` or `"medication"`.
    pub category: Option<String>,
}

/// Everything a severity classifier needs to judge one discrepancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyContext {
    /// Flattened field path.
    pub field: String,
    /// Value in the reference record, if present.
    pub reference: Option<FieldValue>,
    /// Value in the candidate record, if present.
    pub candidate: Option<FieldValue>,
    /// The kind of disagreement the comparator detected.
    pub kind: DiscrepancyType,
    /// Domain knowledge for this field, if any is configured.
    pub hints: Option<DomainHints>,
}

impl DiscrepancyContext {
    /// Build a context from a raw discrepancy plus resolved hints.
    pub fn from_raw(raw: &RawDiscrepancy, hints: Option<DomainHints>) -> Self {
        Self {
            field: raw.field.clone(),
            reference: raw.reference.clone(),
            candidate: raw.candidate.clone(),
            kind: raw.kind,
            hints,
        }
    }
}

/// The verdict a severity classifier returns for one discrepancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Clinical significance tag.
    pub severity: Severity,
    /// Classifier self-assessed confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Free-text justification, carried verbatim into the report.
    pub rationale: String,
    /// Suggested follow-up for the monitor, if the classifier has one.
    pub recommended_action: Option<String>,
}

/// A fully classified discrepancy in report shape.
///
/// Field names and value stringification follow the external report
/// contract: `field` is the flattened path, `field_label` the human form,
/// and both values are stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub field: String,
    pub field_label: String,
    pub reference_value: Option<String>,
    pub candidate_value: Option<String>,
    pub discrepancy_type: DiscrepancyType,
    pub severity: Severity,
    pub confidence: f64,
    pub rationale: String,
    pub recommended_action: Option<String>,
}
