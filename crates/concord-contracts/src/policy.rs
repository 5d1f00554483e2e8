//! Comparison, severity, and scoring policy tables.
//!
//! Policy is explicit configuration data handed to the comparator, the
//! rule-based classifier, and the aggregator — never hard-coded branches.
//! Tables are deserialized from TOML by concord-policy; `validate()` is the
//! startup gate that guarantees a loaded policy can never fail mid-run.
//!
//! Pattern matching follows one rule everywhere: `"*"` matches any field, a
//! trailing `*` matches by prefix (`"vitals.*"`), a leading `*` matches by
//! suffix (`"*systolic_bp"` matches the field at any nesting depth), and
//! anything else must match the flattened field path exactly.

use serde::{Deserialize, Serialize};

use crate::error::{ConcordError, ConcordResult};

/// Return true if `pattern` matches the flattened field path `field`.
pub fn pattern_matches(pattern: &str, field: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return field.starts_with(prefix);
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return field.ends_with(suffix);
    }
    pattern == field
}

// ── Comparison policy ─────────────────────────────────────────────────────────

/// Marks a field (or field pattern) as tolerant to small numeric drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceRule {
    /// Field pattern this rule applies to.
    pub pattern: String,
    /// Relative tolerance: values match when
    /// `|reference - candidate| <= relative * |reference|`.
    pub relative: f64,
}

/// One known unit conversion, applied as `value * factor + offset`.
///
/// Affine form covers both pure scalings (lb → kg) and offset scales
/// (degF → degC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    /// Source unit (candidate side).
    pub from: String,
    /// Target unit (reference side).
    pub to: String,
    /// Multiplicative factor.
    pub factor: f64,
    /// Additive offset, defaults to 0.
    #[serde(default)]
    pub offset: f64,
}

/// The comparator's inspectable policy: which fields tolerate drift, and
/// which unit conversions are known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPolicy {
    /// Ordered tolerance rules; first matching pattern wins.
    #[serde(default)]
    pub tolerances: Vec<ToleranceRule>,
    /// Known unit conversions.
    #[serde(default)]
    pub unit_conversions: Vec<UnitConversion>,
}

impl ComparisonPolicy {
    /// Relative tolerance for `field`, or `None` for exact comparison.
    pub fn tolerance_for(&self, field: &str) -> Option<f64> {
        self.tolerances
            .iter()
            .find(|rule| pattern_matches(&rule.pattern, field))
            .map(|rule| rule.relative)
    }

    /// Look up the conversion from `from` into `to`, if one is configured.
    ///
    /// Unit names are compared after trimming and case-folding so
    /// `"Kg"`/`"kg"` are the same unit.
    pub fn conversion(&self, from: &str, to: &str) -> Option<&UnitConversion> {
        let from = from.trim().to_lowercase();
        let to = to.trim().to_lowercase();
        self.unit_conversions.iter().find(|c| {
            c.from.trim().to_lowercase() == from && c.to.trim().to_lowercase() == to
        })
    }
}

// ── Severity policy ───────────────────────────────────────────────────────────

/// Clinical reference entry for one field pattern.
///
/// Drives the deterministic rule-based classifier: a value outside
/// `safe_range` or a delta above `critical_delta` is critical; a delta above
/// `major_delta` is major; anything else is minor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityRule {
    /// Field pattern this rule applies to.
    pub pattern: String,
    /// Inclusive safety range `[min, max]` for either value.
    pub safe_range: Option<[f64; 2]>,
    /// Absolute delta above which the discrepancy is critical.
    pub critical_delta: f64,
    /// Absolute delta above which the discrepancy is major.
    pub major_delta: f64,
    /// Field category carried into classifier hints.
    #[serde(default)]
    pub category: Option<String>,
}

/// The clinical reference table consulted by the rule-based classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityPolicy {
    /// Ordered rules; first matching pattern wins.
    #[serde(default)]
    pub rules: Vec<SeverityRule>,
}

impl SeverityPolicy {
    /// The first rule matching `field`, if any.
    pub fn rule_for(&self, field: &str) -> Option<&SeverityRule> {
        self.rules
            .iter()
            .find(|rule| pattern_matches(&rule.pattern, field))
    }
}

// ── Scoring policy ────────────────────────────────────────────────────────────

/// Aggregation weights and normalization.
///
/// The weights and the `normalizer_divisor` are empirical constants, not
/// physiology-derived — the normalizer bounds the score so a handful of
/// serious findings on a small record saturate near 1.0 while the same
/// findings on a 500-field record do not dilute to near zero. They live here,
/// not in code, precisely so tests and reviewers can pin or swap them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Weight applied to critical discrepancies.
    pub critical_weight: f64,
    /// Weight applied to major discrepancies.
    pub major_weight: f64,
    /// Weight applied to minor discrepancies.
    pub minor_weight: f64,
    /// Normalizer is `max(1, total_fields_compared / normalizer_divisor)`.
    pub normalizer_divisor: f64,
    /// When set, a run with zero discrepancies reports this single string as
    /// its only risk factor instead of an empty list.
    #[serde(default)]
    pub empty_risk_factor_sentinel: Option<String>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            critical_weight: 1.0,
            major_weight: 0.5,
            minor_weight: 0.15,
            normalizer_divisor: 10.0,
            empty_risk_factor_sentinel: None,
        }
    }
}

impl ScoringPolicy {
    /// The weight for one severity tag.
    pub fn weight(&self, severity: crate::discrepancy::Severity) -> f64 {
        use crate::discrepancy::Severity;
        match severity {
            Severity::Critical => self.critical_weight,
            Severity::Major => self.major_weight,
            Severity::Minor => self.minor_weight,
        }
    }
}

// ── Combined policy ───────────────────────────────────────────────────────────

/// The complete policy bundle a verification engine runs under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcordPolicy {
    #[serde(default)]
    pub comparison: ComparisonPolicy,
    #[serde(default)]
    pub severity: SeverityPolicy,
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

impl ConcordPolicy {
    /// Validate every table entry.
    ///
    /// This is the configuration-time gate: a policy that passes here cannot
    /// produce a policy error during a run. Returns `InvalidPolicy` naming
    /// the first offending entry.
    pub fn validate(&self) -> ConcordResult<()> {
        for rule in &self.comparison.tolerances {
            if rule.pattern.is_empty() {
                return Err(invalid("tolerance rule has an empty pattern"));
            }
            if !(rule.relative > 0.0 && rule.relative <= 1.0) {
                return Err(invalid(format!(
                    "tolerance for pattern '{}' must be in (0, 1], got {}",
                    rule.pattern, rule.relative
                )));
            }
        }

        for conv in &self.comparison.unit_conversions {
            if conv.from.trim().is_empty() || conv.to.trim().is_empty() {
                return Err(invalid("unit conversion with an empty unit name"));
            }
            if conv.factor == 0.0 || !conv.factor.is_finite() || !conv.offset.is_finite() {
                return Err(invalid(format!(
                    "unit conversion '{}' -> '{}' has a degenerate factor/offset",
                    conv.from, conv.to
                )));
            }
        }

        for rule in &self.severity.rules {
            if rule.pattern.is_empty() {
                return Err(invalid("severity rule has an empty pattern"));
            }
            if rule.critical_delta < rule.major_delta {
                return Err(invalid(format!(
                    "severity rule '{}': critical_delta {} is below major_delta {}",
                    rule.pattern, rule.critical_delta, rule.major_delta
                )));
            }
            if rule.major_delta < 0.0 {
                return Err(invalid(format!(
                    "severity rule '{}': major_delta must be non-negative",
                    rule.pattern
                )));
            }
            if let Some([min, max]) = rule.safe_range {
                if min > max {
                    return Err(invalid(format!(
                        "severity rule '{}': safe_range [{min}, {max}] is inverted",
                        rule.pattern
                    )));
                }
            }
        }

        let s = &self.scoring;
        for (name, w) in [
            ("critical_weight", s.critical_weight),
            ("major_weight", s.major_weight),
            ("minor_weight", s.minor_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(invalid(format!("{name} must be in [0, 1], got {w}")));
            }
        }
        if s.minor_weight > s.major_weight || s.major_weight > s.critical_weight {
            return Err(invalid(
                "severity weights must be non-decreasing from minor to critical",
            ));
        }
        if !(s.normalizer_divisor > 0.0) {
            return Err(invalid(format!(
                "normalizer_divisor must be positive, got {}",
                s.normalizer_divisor
            )));
        }

        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConcordError {
    ConcordError::InvalidPolicy {
        reason: reason.into(),
    }
}
