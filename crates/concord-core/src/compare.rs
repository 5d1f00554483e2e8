//! Comparator: type-aware diffing of two flattened records.
//!
//! The field set is the union of both records' keys, visited in lexical
//! order (both inputs are `BTreeMap`s), so output ordering is stable across
//! runs — reports are reproducible and test fixtures diffable.
//!
//! Comparison rules:
//! - quantities: candidate converted into the reference's unit via the
//!   policy's conversion table, then compared numerically; a missing
//!   conversion downgrades the field to `unit_mismatch` instead of aborting
//! - plain numerics: exact, unless a tolerance-policy pattern matches the
//!   field, in which case a relative tolerance applies
//! - strings: trimmed and case-folded before exact comparison
//! - booleans/nulls: exact
//! - differing leaf types: a value mismatch
//!
//! Pure, total function: nothing here fails (the flattener has already
//! rejected malformed input upstream).

use std::collections::BTreeSet;

use tracing::debug;

use concord_contracts::{
    discrepancy::{DiscrepancyType, RawDiscrepancy},
    error::ConcordError,
    policy::ComparisonPolicy,
    record::{FieldValue, FlatRecord},
};

/// Outcome of comparing one field present in both records.
enum Outcome {
    Match,
    Mismatch,
    UnitMismatch(String),
}

/// Diff two flattened records under the given comparison policy.
pub fn compare(
    reference: &FlatRecord,
    candidate: &FlatRecord,
    policy: &ComparisonPolicy,
) -> Vec<RawDiscrepancy> {
    let fields: BTreeSet<&String> = reference.keys().chain(candidate.keys()).collect();
    let total_fields = fields.len();
    let mut discrepancies = Vec::new();

    for field in fields {
        match (reference.get(field), candidate.get(field)) {
            (Some(r), Some(c)) => match compare_values(field, r, c, policy) {
                Outcome::Match => {}
                Outcome::Mismatch => discrepancies.push(RawDiscrepancy {
                    field: field.clone(),
                    reference: Some(r.clone()),
                    candidate: Some(c.clone()),
                    kind: DiscrepancyType::ValueMismatch,
                    note: None,
                }),
                Outcome::UnitMismatch(note) => discrepancies.push(RawDiscrepancy {
                    field: field.clone(),
                    reference: Some(r.clone()),
                    candidate: Some(c.clone()),
                    kind: DiscrepancyType::UnitMismatch,
                    note: Some(note),
                }),
            },
            (Some(r), None) => discrepancies.push(RawDiscrepancy {
                field: field.clone(),
                reference: Some(r.clone()),
                candidate: None,
                kind: DiscrepancyType::MissingInCandidate,
                note: None,
            }),
            (None, Some(c)) => discrepancies.push(RawDiscrepancy {
                field: field.clone(),
                reference: None,
                candidate: Some(c.clone()),
                kind: DiscrepancyType::MissingInReference,
                note: None,
            }),
            (None, None) => unreachable!("field came from the key union"),
        }
    }

    debug!(
        total_fields,
        discrepancy_count = discrepancies.len(),
        "comparison complete"
    );

    discrepancies
}

fn compare_values(
    field: &str,
    reference: &FieldValue,
    candidate: &FieldValue,
    policy: &ComparisonPolicy,
) -> Outcome {
    let tolerance = policy.tolerance_for(field);

    match (reference, candidate) {
        (
            FieldValue::Quantity {
                value: ref_value,
                unit: ref_unit,
            },
            FieldValue::Quantity {
                value: cand_value,
                unit: cand_unit,
            },
        ) => {
            if unit_eq(ref_unit, cand_unit) {
                return matched(numbers_match(*ref_value, *cand_value, tolerance));
            }
            match policy.conversion(cand_unit, ref_unit) {
                Some(conv) => {
                    let converted = cand_value * conv.factor + conv.offset;
                    matched(numbers_match(*ref_value, converted, tolerance))
                }
                None => {
                    // Surface the localized error as the discrepancy note;
                    // the run itself continues.
                    let err = ConcordError::UnsupportedUnitConversion {
                        field: field.to_string(),
                        from: cand_unit.clone(),
                        to: ref_unit.clone(),
                    };
                    Outcome::UnitMismatch(err.to_string())
                }
            }
        }
        (FieldValue::Num(r), FieldValue::Num(c)) => matched(numbers_match(*r, *c, tolerance)),
        (FieldValue::Str(r), FieldValue::Str(c)) => matched(normalize(r) == normalize(c)),
        (FieldValue::Bool(r), FieldValue::Bool(c)) => matched(r == c),
        (FieldValue::Null, FieldValue::Null) => Outcome::Match,
        // Differing leaf types never match.
        _ => Outcome::Mismatch,
    }
}

fn matched(equal: bool) -> Outcome {
    if equal {
        Outcome::Match
    } else {
        Outcome::Mismatch
    }
}

fn unit_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Exact equality unless a relative tolerance is configured for the field.
fn numbers_match(reference: f64, candidate: f64, tolerance: Option<f64>) -> bool {
    match tolerance {
        Some(relative) => (reference - candidate).abs() <= relative * reference.abs(),
        None => reference == candidate,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use concord_contracts::{
        discrepancy::DiscrepancyType,
        policy::{ComparisonPolicy, ToleranceRule, UnitConversion},
    };

    use crate::flatten::flatten;

    use super::compare;

    fn flat(value: serde_json::Value) -> concord_contracts::record::FlatRecord {
        flatten(&value).unwrap()
    }

    // ── Basic diffing ─────────────────────────────────────────────────────────

    #[test]
    fn identical_records_produce_no_discrepancies() {
        let record = json!({ "a": 1, "b": "x", "c": true, "d": null, "e": 2.5 });
        let discrepancies = compare(
            &flat(record.clone()),
            &flat(record),
            &ComparisonPolicy::default(),
        );
        assert!(discrepancies.is_empty());
    }

    #[test]
    fn value_mismatch_is_reported_per_field() {
        let reference = flat(json!({ "systolic_bp": 120, "heart_rate": 72 }));
        let candidate = flat(json!({ "systolic_bp": 180, "heart_rate": 72 }));

        let discrepancies = compare(&reference, &candidate, &ComparisonPolicy::default());

        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].field, "systolic_bp");
        assert_eq!(discrepancies[0].kind, DiscrepancyType::ValueMismatch);
    }

    #[test]
    fn missing_fields_are_flagged_with_direction() {
        let reference = flat(json!({ "only_ref": 1, "shared": 2 }));
        let candidate = flat(json!({ "only_cand": 3, "shared": 2 }));

        let discrepancies = compare(&reference, &candidate, &ComparisonPolicy::default());

        assert_eq!(discrepancies.len(), 2);
        // Lexical order: only_cand before only_ref.
        assert_eq!(discrepancies[0].field, "only_cand");
        assert_eq!(discrepancies[0].kind, DiscrepancyType::MissingInReference);
        assert_eq!(discrepancies[1].field, "only_ref");
        assert_eq!(discrepancies[1].kind, DiscrepancyType::MissingInCandidate);
    }

    /// Array-diff semantics: an extra medication in the candidate appears as
    /// exactly one missing-direction discrepancy for the extra entry.
    #[test]
    fn extra_array_entry_is_one_discrepancy() {
        let reference = flat(json!({ "medications": ["aspirin"] }));
        let candidate = flat(json!({ "medications": ["aspirin", "warfarin"] }));

        let discrepancies = compare(&reference, &candidate, &ComparisonPolicy::default());

        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].field, "medications[1]");
        assert_eq!(discrepancies[0].kind, DiscrepancyType::MissingInReference);
    }

    // ── Normalization ─────────────────────────────────────────────────────────

    #[test]
    fn strings_are_trimmed_and_case_folded() {
        let reference = flat(json!({ "dose_unit": "MG " }));
        let candidate = flat(json!({ "dose_unit": " mg" }));

        let discrepancies = compare(&reference, &candidate, &ComparisonPolicy::default());
        assert!(discrepancies.is_empty());
    }

    #[test]
    fn differing_leaf_types_mismatch() {
        let reference = flat(json!({ "weight": 70 }));
        let candidate = flat(json!({ "weight": "70" }));

        let discrepancies = compare(&reference, &candidate, &ComparisonPolicy::default());
        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].kind, DiscrepancyType::ValueMismatch);
    }

    // ── Tolerance policy ──────────────────────────────────────────────────────

    #[test]
    fn tolerant_field_accepts_small_relative_drift() {
        let policy = ComparisonPolicy {
            tolerances: vec![ToleranceRule {
                pattern: "weight".to_string(),
                relative: 0.01,
            }],
            unit_conversions: vec![],
        };

        // 0.5% drift on a tolerant field: match.
        let reference = flat(json!({ "weight": 70.0 }));
        let candidate = flat(json!({ "weight": 70.35 }));
        assert!(compare(&reference, &candidate, &policy).is_empty());

        // 2% drift: mismatch.
        let drifted = flat(json!({ "weight": 71.4 }));
        assert_eq!(compare(&reference, &drifted, &policy).len(), 1);

        // Same drift on a non-tolerant field: mismatch.
        let reference = flat(json!({ "heart_rate": 70.0 }));
        let candidate = flat(json!({ "heart_rate": 70.35 }));
        assert_eq!(compare(&reference, &candidate, &policy).len(), 1);
    }

    // ── Unit handling ─────────────────────────────────────────────────────────

    #[test]
    fn known_conversion_reconciles_quantities() {
        let policy = ComparisonPolicy {
            tolerances: vec![ToleranceRule {
                pattern: "weight".to_string(),
                relative: 0.01,
            }],
            unit_conversions: vec![UnitConversion {
                from: "lb".to_string(),
                to: "kg".to_string(),
                factor: 0.453_592_37,
                offset: 0.0,
            }],
        };

        let reference = flat(json!({ "weight": { "value": 70.0, "unit": "kg" } }));
        let candidate = flat(json!({ "weight": { "value": 154.3, "unit": "lb" } }));

        // 154.3 lb = 69.99 kg, within the 1% tolerance.
        assert!(compare(&reference, &candidate, &policy).is_empty());
    }

    #[test]
    fn unknown_conversion_downgrades_to_unit_mismatch() {
        let reference = flat(json!({ "weight": { "value": 70.0, "unit": "kg" } }));
        let candidate = flat(json!({ "weight": { "value": 11.0, "unit": "stone" } }));

        let discrepancies = compare(&reference, &candidate, &ComparisonPolicy::default());

        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].kind, DiscrepancyType::UnitMismatch);
        let note = discrepancies[0].note.as_deref().unwrap();
        assert!(note.contains("stone"), "note should name the units: {note}");
        assert!(note.contains("kg"));
    }

    #[test]
    fn same_unit_quantities_compare_numerically() {
        let reference = flat(json!({ "temp": { "value": 37.0, "unit": "degC" } }));
        let matching = flat(json!({ "temp": { "value": 37.0, "unit": "degc" } }));
        let differing = flat(json!({ "temp": { "value": 39.5, "unit": "degC" } }));

        assert!(compare(&reference, &matching, &ComparisonPolicy::default()).is_empty());
        assert_eq!(
            compare(&reference, &differing, &ComparisonPolicy::default()).len(),
            1
        );
    }

    // ── Ordering and symmetry properties ──────────────────────────────────────

    #[test]
    fn output_is_lexically_ordered_and_idempotent() {
        let reference = flat(json!({ "z": 1, "a": 2, "m": 3 }));
        let candidate = flat(json!({ "z": 9, "a": 8, "m": 7 }));

        let first = compare(&reference, &candidate, &ComparisonPolicy::default());
        let second = compare(&reference, &candidate, &ComparisonPolicy::default());

        let fields: Vec<&str> = first.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "m", "z"]);
        assert_eq!(first, second, "repeat comparison must be identical");
    }

    /// Swapping reference and candidate flags the same field set; only the
    /// missing-direction kinds swap.
    #[test]
    fn swap_symmetry_of_flagged_fields() {
        let left = flat(json!({ "shared": 1, "only_left": 2, "differs": "x" }));
        let right = flat(json!({ "shared": 1, "only_right": 3, "differs": "y" }));

        let forward = compare(&left, &right, &ComparisonPolicy::default());
        let reverse = compare(&right, &left, &ComparisonPolicy::default());

        let forward_fields: Vec<&str> = forward.iter().map(|d| d.field.as_str()).collect();
        let reverse_fields: Vec<&str> = reverse.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(forward_fields, reverse_fields);

        let kind_of = |list: &[concord_contracts::discrepancy::RawDiscrepancy], f: &str| {
            list.iter().find(|d| d.field == f).unwrap().kind
        };
        assert_eq!(
            kind_of(&forward, "only_left"),
            DiscrepancyType::MissingInCandidate
        );
        assert_eq!(
            kind_of(&reverse, "only_left"),
            DiscrepancyType::MissingInReference
        );

        // Same flagged count over the same key union: aggregating either
        // direction must report the same match percentage.
        let minor = |raw: concord_contracts::discrepancy::RawDiscrepancy| {
            (
                raw,
                concord_contracts::discrepancy::Classification {
                    severity: concord_contracts::discrepancy::Severity::Minor,
                    confidence: 0.5,
                    rationale: "swap check".to_string(),
                    recommended_action: None,
                },
            )
        };
        let forward_classified: Vec<_> = forward.into_iter().map(minor).collect();
        let reverse_classified: Vec<_> = reverse.into_iter().map(minor).collect();

        let policy = concord_contracts::policy::ScoringPolicy::default();
        let forward_agg = crate::aggregate::aggregate(4, &forward_classified, &policy);
        let reverse_agg = crate::aggregate::aggregate(4, &reverse_classified, &policy);
        assert_eq!(forward_agg.match_percentage, reverse_agg.match_percentage);
    }
}
