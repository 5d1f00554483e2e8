//! Aggregator: classified discrepancies → match percentage, risk score,
//! risk level, and ranked risk factors.
//!
//! Pure function of its inputs — classification has already happened
//! upstream, so scoring stays testable independent of classification source
//! and no non-determinism can leak in here.

use std::collections::BTreeSet;

use tracing::debug;

use concord_contracts::{
    discrepancy::{Classification, RawDiscrepancy, Severity},
    policy::ScoringPolicy,
    record::field_label,
    run::RiskLevel,
};

/// The aggregator's output, consumed by the report builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Percent of compared fields with no discrepancy, one decimal place,
    /// rounded half-to-even.
    pub match_percentage: f64,
    /// Weighted risk in `0.0..=1.0`, rounded to two decimal places.
    pub risk_score: f64,
    /// Ladder bucket of the *unrounded* risk score.
    pub risk_level: RiskLevel,
    /// Human-readable strings for critical/major findings, deduplicated by
    /// field, ordered by descending severity then field path.
    pub risk_factors: Vec<String>,
}

/// Aggregate one run's classified discrepancies.
///
/// `total_fields` is the size of the union of field paths in both records.
/// With zero fields the match is vacuously full (100.0).
pub fn aggregate(
    total_fields: usize,
    classified: &[(RawDiscrepancy, Classification)],
    policy: &ScoringPolicy,
) -> Aggregation {
    let match_percentage = if total_fields == 0 {
        100.0
    } else {
        let matched = total_fields.saturating_sub(classified.len());
        round_half_even(matched as f64 / total_fields as f64 * 100.0, 1)
    };

    // risk_score = min(1, Σ weight·confidence / normalizer).
    // The normalizer is the policy's explicit small-record saturation knob.
    let normalizer = (total_fields as f64 / policy.normalizer_divisor).max(1.0);
    let weighted_sum: f64 = classified
        .iter()
        .map(|(_, c)| policy.weight(c.severity) * c.confidence)
        .sum();
    let raw_score = (weighted_sum / normalizer).min(1.0);

    let risk_level = RiskLevel::from_score(raw_score);
    let risk_factors = collect_risk_factors(classified, policy);

    debug!(
        total_fields,
        discrepancy_count = classified.len(),
        risk_score = raw_score,
        ?risk_level,
        "aggregation complete"
    );

    Aggregation {
        match_percentage,
        risk_score: round_half_even(raw_score, 2),
        risk_level,
        risk_factors,
    }
}

/// One line per critical/major discrepancy, deduplicated by field,
/// ordered severity-descending then field-ascending.
fn collect_risk_factors(
    classified: &[(RawDiscrepancy, Classification)],
    policy: &ScoringPolicy,
) -> Vec<String> {
    if classified.is_empty() {
        return match &policy.empty_risk_factor_sentinel {
            Some(sentinel) => vec![sentinel.clone()],
            None => Vec::new(),
        };
    }

    let mut entries: Vec<(Severity, &str, &str)> = classified
        .iter()
        .filter(|(_, c)| c.severity >= Severity::Major)
        .map(|(raw, c)| (c.severity, raw.field.as_str(), c.rationale.as_str()))
        .collect();

    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    // Severity-descending order means the first occurrence of a field is its
    // most severe finding; later occurrences at any severity are dropped.
    let mut seen = BTreeSet::new();
    entries
        .into_iter()
        .filter(|(_, field, _)| seen.insert(*field))
        .map(|(severity, field, rationale)| {
            format!("[{severity}] {}: {rationale}", field_label(field))
        })
        .collect()
}

/// Round to `dp` decimal places using round-half-to-even.
pub(crate) fn round_half_even(value: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    let scaled = value * scale;
    let floor = scaled.floor();
    let diff = scaled - floor;

    // Treat near-exact halves as halves; beyond this the usual rounding
    // applies and f64 noise is irrelevant at 1-2 decimal places.
    let rounded = if (diff - 0.5).abs() < 1e-9 {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };

    rounded / scale
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use concord_contracts::{
        discrepancy::{Classification, DiscrepancyType, RawDiscrepancy, Severity},
        policy::ScoringPolicy,
        run::RiskLevel,
    };

    use super::{aggregate, round_half_even};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn raw(field: &str) -> RawDiscrepancy {
        RawDiscrepancy {
            field: field.to_string(),
            reference: Some(concord_contracts::record::FieldValue::Num(1.0)),
            candidate: Some(concord_contracts::record::FieldValue::Num(2.0)),
            kind: DiscrepancyType::ValueMismatch,
            note: None,
        }
    }

    fn classified(
        field: &str,
        severity: Severity,
        confidence: f64,
    ) -> (RawDiscrepancy, Classification) {
        (
            raw(field),
            Classification {
                severity,
                confidence,
                rationale: format!("{severity} finding"),
                recommended_action: None,
            },
        )
    }

    // ── Match percentage ──────────────────────────────────────────────────────

    #[test]
    fn zero_fields_is_a_vacuous_full_match() {
        let agg = aggregate(0, &[], &ScoringPolicy::default());
        assert_eq!(agg.match_percentage, 100.0);
        assert_eq!(agg.risk_score, 0.0);
        assert_eq!(agg.risk_level, RiskLevel::Minimal);
    }

    #[test]
    fn match_percentage_formula_holds() {
        let discrepancies = vec![classified("a", Severity::Minor, 0.5)];
        let agg = aggregate(5, &discrepancies, &ScoringPolicy::default());
        // (5 - 1) / 5 * 100 = 80.0
        assert_eq!(agg.match_percentage, 80.0);
    }

    #[test]
    fn match_percentage_rounds_to_one_decimal() {
        let discrepancies = vec![classified("a", Severity::Minor, 0.5)];
        // (3 - 1) / 3 * 100 = 66.666… → 66.7
        let agg = aggregate(3, &discrepancies, &ScoringPolicy::default());
        assert_eq!(agg.match_percentage, 66.7);
    }

    #[test]
    fn full_match_iff_no_discrepancies() {
        let clean = aggregate(5, &[], &ScoringPolicy::default());
        assert_eq!(clean.match_percentage, 100.0);

        let dirty = aggregate(
            5,
            &[classified("a", Severity::Minor, 0.1)],
            &ScoringPolicy::default(),
        );
        assert!(dirty.match_percentage < 100.0);
        assert!(dirty.match_percentage >= 0.0);
    }

    // ── Half-to-even rounding ─────────────────────────────────────────────────

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_half_even(0.25, 1), 0.2);
        assert_eq!(round_half_even(0.35, 1), 0.4);
        assert_eq!(round_half_even(0.125, 2), 0.12);
        assert_eq!(round_half_even(62.5, 0), 62.0);
        assert_eq!(round_half_even(63.5, 0), 64.0);
        assert_eq!(round_half_even(66.666_666, 1), 66.7);
    }

    // ── Risk score ────────────────────────────────────────────────────────────

    /// One critical finding at full confidence on a single-field record
    /// saturates: weight 1.0 × confidence 0.95 / normalizer 1 = 0.95.
    #[test]
    fn single_critical_on_small_record_saturates() {
        let agg = aggregate(
            1,
            &[classified("systolic_bp", Severity::Critical, 0.95)],
            &ScoringPolicy::default(),
        );
        assert!(agg.risk_score >= 0.8, "score was {}", agg.risk_score);
        assert_eq!(agg.risk_level, RiskLevel::Critical);
    }

    /// The normalizer prevents dilution-free growth: the same finding on a
    /// 500-field record scores far lower.
    #[test]
    fn normalizer_scales_with_record_size() {
        let discrepancies = vec![classified("systolic_bp", Severity::Critical, 0.95)];

        let small = aggregate(1, &discrepancies, &ScoringPolicy::default());
        let large = aggregate(500, &discrepancies, &ScoringPolicy::default());

        // normalizer for 500 fields is 50 → 0.95 / 50 = 0.019.
        assert!(large.risk_score < 0.05);
        assert!(small.risk_score > large.risk_score);
        assert_eq!(large.risk_level, RiskLevel::Minimal);
    }

    #[test]
    fn risk_score_is_capped_at_one() {
        let discrepancies: Vec<_> = (0..10)
            .map(|i| classified(&format!("f{i}"), Severity::Critical, 1.0))
            .collect();
        let agg = aggregate(5, &discrepancies, &ScoringPolicy::default());
        assert_eq!(agg.risk_score, 1.0);
    }

    /// Raising any discrepancy's severity (minor → major → critical) while
    /// holding all else fixed never lowers the score.
    #[test]
    fn risk_score_monotone_in_severity() {
        let score_for = |severity| {
            aggregate(
                10,
                &[
                    classified("a", Severity::Minor, 0.5),
                    classified("b", severity, 0.8),
                ],
                &ScoringPolicy::default(),
            )
            .risk_score
        };

        let minor = score_for(Severity::Minor);
        let major = score_for(Severity::Major);
        let critical = score_for(Severity::Critical);

        assert!(minor <= major, "{minor} <= {major}");
        assert!(major <= critical, "{major} <= {critical}");
    }

    /// The ladder is evaluated on the unrounded score: a raw score just
    /// below 0.8 reports as High even though it prints as 0.80.
    #[test]
    fn ladder_uses_unrounded_score() {
        // weight 1.0 × confidence 0.799 / normalizer 1 = 0.799.
        let agg = aggregate(
            1,
            &[classified("a", Severity::Critical, 0.799)],
            &ScoringPolicy::default(),
        );
        assert_eq!(agg.risk_score, 0.8);
        assert_eq!(agg.risk_level, RiskLevel::High);
    }

    // ── Risk factors ──────────────────────────────────────────────────────────

    #[test]
    fn risk_factors_only_cover_critical_and_major() {
        let agg = aggregate(
            10,
            &[
                classified("minor_field", Severity::Minor, 0.5),
                classified("major_field", Severity::Major, 0.8),
                classified("critical_field", Severity::Critical, 0.9),
            ],
            &ScoringPolicy::default(),
        );

        assert_eq!(agg.risk_factors.len(), 2);
        // Severity-descending: critical first.
        assert!(agg.risk_factors[0].contains("Critical Field"));
        assert!(agg.risk_factors[0].starts_with("[critical]"));
        assert!(agg.risk_factors[1].contains("Major Field"));
    }

    #[test]
    fn risk_factors_are_deduplicated_by_field() {
        let agg = aggregate(
            10,
            &[
                classified("same_field", Severity::Critical, 0.9),
                classified("same_field", Severity::Critical, 0.9),
            ],
            &ScoringPolicy::default(),
        );
        assert_eq!(agg.risk_factors.len(), 1);
    }

    /// A field reported at two different severities still yields one factor,
    /// carrying its most severe finding.
    #[test]
    fn mixed_severity_duplicates_keep_only_the_most_severe_factor() {
        let agg = aggregate(
            10,
            &[
                classified("same_field", Severity::Major, 0.8),
                classified("other_field", Severity::Critical, 0.9),
                classified("same_field", Severity::Critical, 0.9),
            ],
            &ScoringPolicy::default(),
        );

        assert_eq!(agg.risk_factors.len(), 2);
        let same: Vec<&String> = agg
            .risk_factors
            .iter()
            .filter(|f| f.contains("Same Field"))
            .collect();
        assert_eq!(same.len(), 1);
        assert!(same[0].starts_with("[critical]"), "kept factor: {}", same[0]);
    }

    #[test]
    fn empty_run_uses_configured_sentinel() {
        let silent = aggregate(5, &[], &ScoringPolicy::default());
        assert!(silent.risk_factors.is_empty());

        let policy = ScoringPolicy {
            empty_risk_factor_sentinel: Some("no discrepancies found".to_string()),
            ..ScoringPolicy::default()
        };
        let sentinel = aggregate(5, &[], &policy);
        assert_eq!(sentinel.risk_factors, vec!["no discrepancies found"]);
    }

    #[test]
    fn equal_severity_factors_order_by_field() {
        let agg = aggregate(
            10,
            &[
                classified("zeta", Severity::Major, 0.8),
                classified("alpha", Severity::Major, 0.8),
            ],
            &ScoringPolicy::default(),
        );
        assert!(agg.risk_factors[0].contains("Alpha"));
        assert!(agg.risk_factors[1].contains("Zeta"));
    }
}
