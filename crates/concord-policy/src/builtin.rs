//! Built-in clinical policy tables.
//!
//! A reviewed starting point covering the common vital-sign and
//! medication fields the demo and test records use. Deployments are
//! expected to load their own tables from TOML; nothing in the engine
//! depends on these particular entries.
//!
//! Thresholds are deliberately conservative and are configuration, not
//! clinical guidance.

use concord_contracts::policy::{
    ComparisonPolicy, ConcordPolicy, ScoringPolicy, SeverityPolicy, SeverityRule, ToleranceRule,
    UnitConversion,
};

/// The bundled clinical policy.
pub fn clinical_defaults() -> ConcordPolicy {
    ConcordPolicy {
        comparison: ComparisonPolicy {
            tolerances: vec![
                // Weights drift with scale calibration and clothing.
                ToleranceRule {
                    pattern: "weight*".to_string(),
                    relative: 0.01,
                },
                ToleranceRule {
                    pattern: "vitals.weight*".to_string(),
                    relative: 0.01,
                },
                // Converted temperatures (degF -> degC) round in the last
                // decimal place; a 0.1% band absorbs that without masking
                // real drift.
                ToleranceRule {
                    pattern: "*temperature".to_string(),
                    relative: 0.001,
                },
            ],
            unit_conversions: vec![
                UnitConversion {
                    from: "lb".to_string(),
                    to: "kg".to_string(),
                    factor: 0.453_592_37,
                    offset: 0.0,
                },
                UnitConversion {
                    from: "kg".to_string(),
                    to: "lb".to_string(),
                    factor: 2.204_622_62,
                    offset: 0.0,
                },
                // degF -> degC: (F - 32) * 5/9.
                UnitConversion {
                    from: "degf".to_string(),
                    to: "degc".to_string(),
                    factor: 5.0 / 9.0,
                    offset: -160.0 / 9.0,
                },
                UnitConversion {
                    from: "cm".to_string(),
                    to: "m".to_string(),
                    factor: 0.01,
                    offset: 0.0,
                },
            ],
        },
        severity: SeverityPolicy {
            rules: vec![
                SeverityRule {
                    pattern: "*systolic_bp".to_string(),
                    safe_range: Some([90.0, 180.0]),
                    critical_delta: 40.0,
                    major_delta: 15.0,
                    category: Some("vital_sign".to_string()),
                },
                SeverityRule {
                    pattern: "*diastolic_bp".to_string(),
                    safe_range: Some([50.0, 110.0]),
                    critical_delta: 25.0,
                    major_delta: 10.0,
                    category: Some("vital_sign".to_string()),
                },
                SeverityRule {
                    pattern: "*heart_rate".to_string(),
                    safe_range: Some([40.0, 150.0]),
                    critical_delta: 30.0,
                    major_delta: 12.0,
                    category: Some("vital_sign".to_string()),
                },
                SeverityRule {
                    pattern: "*temperature".to_string(),
                    safe_range: Some([35.0, 39.5]),
                    critical_delta: 2.0,
                    major_delta: 0.8,
                    category: Some("vital_sign".to_string()),
                },
                SeverityRule {
                    pattern: "*glucose".to_string(),
                    safe_range: Some([54.0, 250.0]),
                    critical_delta: 60.0,
                    major_delta: 25.0,
                    category: Some("lab".to_string()),
                },
                SeverityRule {
                    pattern: "medications*".to_string(),
                    safe_range: None,
                    critical_delta: 0.0,
                    major_delta: 0.0,
                    category: Some("medication".to_string()),
                },
            ],
        },
        scoring: ScoringPolicy::default(),
    }
}
