//! The deterministic rule-based severity classifier.
//!
//! `RuleBasedClassifier` consults the severity policy's clinical reference
//! table. For a matched numeric field:
//!
//! - either value outside the safe range, or delta above the critical
//!   threshold → critical
//! - delta above the major threshold → major
//! - otherwise → minor
//!
//! Fields with no table entry default to minor with confidence 0.5 and a
//! rationale stating no clinical reference is available. A malformed context
//! (non-numeric values for a numerically configured field) degrades to minor
//! with confidence 0.0 — a well-formed context never produces an `Err`, so
//! this classifier is safe as the engine's always-available fallback.

use async_trait::async_trait;
use tracing::debug;

use concord_contracts::{
    discrepancy::{Classification, DiscrepancyContext, DiscrepancyType, Severity},
    error::ConcordResult,
    policy::{SeverityPolicy, SeverityRule},
};
use concord_core::traits::SeverityClassifier;

// Confidence levels for table-backed verdicts. Table-matched findings are
// high-confidence; the untracked-field default is deliberately middling.
const CONFIDENCE_CRITICAL: f64 = 0.95;
const CONFIDENCE_MAJOR: f64 = 0.85;
const CONFIDENCE_MINOR: f64 = 0.7;
const CONFIDENCE_NO_REFERENCE: f64 = 0.5;

/// Deterministic classifier over a clinical severity reference table.
#[derive(Debug, Clone)]
pub struct RuleBasedClassifier {
    policy: SeverityPolicy,
}

impl RuleBasedClassifier {
    /// Build a classifier over the given severity table.
    pub fn new(policy: SeverityPolicy) -> Self {
        Self { policy }
    }

    fn classify_inner(&self, ctx: &DiscrepancyContext) -> Classification {
        let Some(rule) = self.policy.rule_for(&ctx.field) else {
            return Classification {
                severity: Severity::Minor,
                confidence: CONFIDENCE_NO_REFERENCE,
                rationale: format!("no clinical reference available for '{}'", ctx.field),
                recommended_action: None,
            };
        };

        debug!(field = %ctx.field, pattern = %rule.pattern, "clinical reference rule matched");

        match ctx.kind {
            DiscrepancyType::MissingInReference | DiscrepancyType::MissingInCandidate => {
                self.classify_missing(ctx, rule)
            }
            DiscrepancyType::UnitMismatch => Classification {
                severity: Severity::Major,
                confidence: 0.6,
                rationale: format!(
                    "units for '{}' could not be reconciled; the values were not compared",
                    ctx.field
                ),
                recommended_action: Some("confirm the recorded unit against the source".to_string()),
            },
            DiscrepancyType::ValueMismatch => self.classify_mismatch(ctx, rule),
        }
    }

    /// A tracked field missing on one side is at least major; a present
    /// value outside the safe range raises it to critical.
    fn classify_missing(&self, ctx: &DiscrepancyContext, rule: &SeverityRule) -> Classification {
        let side = match ctx.kind {
            DiscrepancyType::MissingInReference => "the reference record",
            _ => "the source document",
        };
        let present = ctx.reference.as_ref().or(ctx.candidate.as_ref());
        let present_number = present.and_then(|v| v.as_number());

        if let (Some(value), Some([min, max])) = (present_number, rule.safe_range) {
            if value < min || value > max {
                return Classification {
                    severity: Severity::Critical,
                    confidence: CONFIDENCE_CRITICAL,
                    rationale: format!(
                        "'{}' is missing in {side} and the recorded value {value} lies outside the safe range [{min}, {max}]",
                        ctx.field
                    ),
                    recommended_action: Some("escalate for immediate source review".to_string()),
                };
            }
        }

        Classification {
            severity: Severity::Major,
            confidence: CONFIDENCE_MAJOR,
            rationale: format!(
                "'{}' is tracked by the clinical reference but missing in {side}",
                ctx.field
            ),
            recommended_action: Some("query the site for the missing entry".to_string()),
        }
    }

    fn classify_mismatch(&self, ctx: &DiscrepancyContext, rule: &SeverityRule) -> Classification {
        let numbers = (
            ctx.reference.as_ref().and_then(|v| v.as_number()),
            ctx.candidate.as_ref().and_then(|v| v.as_number()),
        );

        let (reference, candidate) = match numbers {
            (Some(r), Some(c)) => (r, c),
            _ if rule_is_numeric(rule) => {
                // Malformed context for a numerically configured field:
                // degrade rather than fail the run.
                return Classification {
                    severity: Severity::Minor,
                    confidence: 0.0,
                    rationale: format!(
                        "'{}' is configured as numeric but at least one recorded value is not",
                        ctx.field
                    ),
                    recommended_action: None,
                };
            }
            _ => {
                // Categorical field under a non-numeric rule (e.g. a
                // medication name): a tracked difference is major.
                let category = rule.category.as_deref().unwrap_or("tracked");
                return Classification {
                    severity: Severity::Major,
                    confidence: CONFIDENCE_MAJOR,
                    rationale: format!("recorded {category} entry for '{}' differs", ctx.field),
                    recommended_action: Some("verify the entry against the source".to_string()),
                };
            }
        };

        if let Some([min, max]) = rule.safe_range {
            if reference < min || reference > max || candidate < min || candidate > max {
                return Classification {
                    severity: Severity::Critical,
                    confidence: CONFIDENCE_CRITICAL,
                    rationale: format!(
                        "a recorded value for '{}' lies outside the safe range [{min}, {max}]",
                        ctx.field
                    ),
                    recommended_action: Some("escalate for immediate source review".to_string()),
                };
            }
        }

        let delta = (reference - candidate).abs();
        if delta > rule.critical_delta {
            Classification {
                severity: Severity::Critical,
                confidence: CONFIDENCE_CRITICAL,
                rationale: format!(
                    "delta {delta} for '{}' exceeds the critical threshold {}",
                    ctx.field, rule.critical_delta
                ),
                recommended_action: Some("escalate for immediate source review".to_string()),
            }
        } else if delta > rule.major_delta {
            Classification {
                severity: Severity::Major,
                confidence: CONFIDENCE_MAJOR,
                rationale: format!(
                    "delta {delta} for '{}' exceeds the major threshold {}",
                    ctx.field, rule.major_delta
                ),
                recommended_action: Some("query the site for the discrepancy".to_string()),
            }
        } else {
            Classification {
                severity: Severity::Minor,
                confidence: CONFIDENCE_MINOR,
                rationale: format!("delta {delta} for '{}' is below both thresholds", ctx.field),
                recommended_action: None,
            }
        }
    }
}

/// A rule expects numeric values when it carries a range or non-zero deltas.
fn rule_is_numeric(rule: &SeverityRule) -> bool {
    rule.safe_range.is_some() || rule.critical_delta > 0.0 || rule.major_delta > 0.0
}

#[async_trait]
impl SeverityClassifier for RuleBasedClassifier {
    /// Classify one discrepancy. Deterministic, never suspends, never fails.
    async fn classify(&self, ctx: &DiscrepancyContext) -> ConcordResult<Classification> {
        Ok(self.classify_inner(ctx))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
