//! Simulated clinical records for the CONCORD demo.
//!
//! All data in this module is hardcoded and fictional. No external systems
//! are contacted. The reference record stands in for the electronic data
//! capture (EDC) system of record; the candidates stand in for transcribed
//! source documents in various states of agreement.

use serde_json::{json, Value};

/// The EDC reference record for subject SUBJ-1024, visit V3.
///
/// Nested demographics, vitals (with unit-tagged quantities), a medication
/// list, and a lab panel. Weight is recorded in kilograms; temperature in
/// Celsius.
pub fn reference_record() -> Value {
    json!({
        "demographics": {
            "subject_id": "SUBJ-1024",
            "date_of_birth": "1967-03-14",
            "sex": "F"
        },
        "vitals": {
            "systolic_bp": 128,
            "diastolic_bp": 82,
            "heart_rate": 71,
            "temperature": { "value": 37.0, "unit": "degC" },
            "weight": { "value": 70.0, "unit": "kg" }
        },
        "medications": [
            { "name": "lisinopril", "dose_mg": 10, "frequency": "daily" },
            { "name": "metformin", "dose_mg": 500, "frequency": "twice daily" }
        ],
        "labs": {
            "glucose": 104,
            "hemoglobin": 13.2
        }
    })
}

/// A faithfully transcribed source document.
///
/// Agrees with the reference everywhere once units are normalized: weight is
/// recorded in pounds (154 lb ≈ 69.85 kg, inside the 1% weight tolerance)
/// and temperature in Fahrenheit (98.6 °F = 37.0 °C exactly).
pub fn candidate_matching() -> Value {
    json!({
        "demographics": {
            "subject_id": "SUBJ-1024",
            "date_of_birth": "1967-03-14",
            "sex": "F"
        },
        "vitals": {
            "systolic_bp": 128,
            "diastolic_bp": 82,
            "heart_rate": 71,
            "temperature": { "value": 98.6, "unit": "degF" },
            "weight": { "value": 154.0, "unit": "lb" }
        },
        "medications": [
            { "name": "lisinopril", "dose_mg": 10, "frequency": "daily" },
            { "name": "metformin", "dose_mg": 500, "frequency": "twice daily" }
        ],
        "labs": {
            "glucose": 104,
            "hemoglobin": 13.2
        }
    })
}

/// A source document with a dangerous transcription error.
///
/// Systolic blood pressure reads 190 instead of 128 — outside the [90, 180]
/// safe range, so the rule-based classifier must grade it critical. Heart
/// rate also drifts by a clinically minor 3 bpm.
pub fn candidate_critical_vital() -> Value {
    json!({
        "demographics": {
            "subject_id": "SUBJ-1024",
            "date_of_birth": "1967-03-14",
            "sex": "F"
        },
        "vitals": {
            "systolic_bp": 190,
            "diastolic_bp": 82,
            "heart_rate": 74,
            "temperature": { "value": 37.0, "unit": "degC" },
            "weight": { "value": 70.0, "unit": "kg" }
        },
        "medications": [
            { "name": "lisinopril", "dose_mg": 10, "frequency": "daily" },
            { "name": "metformin", "dose_mg": 500, "frequency": "twice daily" }
        ],
        "labs": {
            "glucose": 104,
            "hemoglobin": 13.2
        }
    })
}

/// A source document missing the second medication entirely.
///
/// `medications[1].*` exists only in the reference, producing missing-field
/// discrepancies under the categorical medication rule.
pub fn candidate_missing_medication() -> Value {
    json!({
        "demographics": {
            "subject_id": "SUBJ-1024",
            "date_of_birth": "1967-03-14",
            "sex": "F"
        },
        "vitals": {
            "systolic_bp": 128,
            "diastolic_bp": 82,
            "heart_rate": 71,
            "temperature": { "value": 37.0, "unit": "degC" },
            "weight": { "value": 70.0, "unit": "kg" }
        },
        "medications": [
            { "name": "lisinopril", "dose_mg": 10, "frequency": "daily" }
        ],
        "labs": {
            "glucose": 104,
            "hemoglobin": 13.2
        }
    })
}
