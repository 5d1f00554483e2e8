//! Report builder: assembles and freezes the final `VerificationRun`.
//!
//! This is the only component that mints run ids or stamps the
//! verification date. Upstream output (comparator order, classifier
//! verdicts, aggregation figures) is carried through unchanged.

use chrono::Utc;
use tracing::info;

use concord_contracts::{
    discrepancy::{Classification, Discrepancy, RawDiscrepancy},
    record::field_label,
    run::{VerificationRun, VerificationSummary},
};

use crate::aggregate::Aggregation;

/// Mint a collision-resistant run identifier.
///
/// Combines the UTC timestamp, a slug of the subject id, and the first
/// eight hex digits of a v4 UUID: `vr-20260829143015-s-001-9f8a2c41`.
pub fn mint_run_id(subject_id: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let slug: String = subject_id
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let tail = uuid::Uuid::new_v4().simple().to_string();
    format!("vr-{stamp}-{slug}-{}", &tail[..8])
}

/// Assemble the final report for one verification run.
///
/// `classified` must be in comparator discovery order; the report preserves
/// it. The returned run is frozen — nothing mutates it afterwards.
pub fn build_report(
    subject_id: &str,
    visit_id: Option<&str>,
    total_fields_compared: usize,
    classified: Vec<(RawDiscrepancy, Classification)>,
    aggregation: Aggregation,
) -> VerificationRun {
    let discrepancies: Vec<Discrepancy> = classified
        .into_iter()
        .map(|(raw, classification)| Discrepancy {
            field_label: field_label(&raw.field),
            field: raw.field,
            reference_value: raw.reference.map(|v| v.to_string()),
            candidate_value: raw.candidate.map(|v| v.to_string()),
            discrepancy_type: raw.kind,
            severity: classification.severity,
            confidence: classification.confidence,
            rationale: classification.rationale,
            recommended_action: classification.recommended_action,
        })
        .collect();

    let run = VerificationRun {
        run_id: mint_run_id(subject_id),
        subject_id: subject_id.to_string(),
        visit_id: visit_id.map(str::to_string),
        verification_date: Utc::now(),
        total_fields_compared,
        verification_summary: VerificationSummary::from_discrepancies(&discrepancies),
        discrepancies,
        match_percentage: aggregation.match_percentage,
        risk_score: aggregation.risk_score,
        risk_level: aggregation.risk_level,
        risk_factors: aggregation.risk_factors,
    };

    info!(
        run_id = %run.run_id,
        subject_id = %run.subject_id,
        total_fields = run.total_fields_compared,
        discrepancy_count = run.discrepancies.len(),
        match_percentage = run.match_percentage,
        risk_level = %run.risk_level,
        "verification report assembled"
    );

    run
}

// ── Tests ─────────────────────────────────────────────────────────────────────
