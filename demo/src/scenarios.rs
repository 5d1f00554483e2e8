//! The four demo scenarios.
//!
//! Each scenario wires real CONCORD components (clinical default policy,
//! rule-based classifier, verification engine, hash-chained run store) around
//! one of the fictional record pairs from `records`, runs a full
//! reconciliation, prints the report, and verifies the run log chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use concord_classify::RuleBasedClassifier;
use concord_contracts::{
    discrepancy::{Classification, DiscrepancyContext},
    error::ConcordResult,
    run::VerificationRun,
};
use concord_core::{
    traits::{RunStore, SeverityClassifier},
    ClassifierLimits, VerificationEngine, VerificationRequest,
};
use concord_policy::clinical_defaults;
use concord_runlog::InMemoryRunStore;

use crate::records;

// ── Shared wiring ─────────────────────────────────────────────────────────────

/// Build an engine with the clinical default policy and the rule-based
/// classifier on both seams.
fn default_engine() -> ConcordResult<VerificationEngine> {
    let policy = clinical_defaults();
    let classifier = Arc::new(RuleBasedClassifier::new(policy.severity.clone()));
    VerificationEngine::new(policy, classifier.clone(), classifier)
}

/// Run one request through the engine, record the run, and print the report.
async fn run_and_record(
    engine: &VerificationEngine,
    store: &InMemoryRunStore,
    request: &VerificationRequest,
) -> ConcordResult<VerificationRun> {
    let run = engine.verify(request).await?;
    store.append(&run)?;
    print_report(&run);

    let log = store.export_log();
    println!(
        "  Run log chain:          {} ({} entry(ies) in chain)",
        if store.verify_integrity() { "VERIFIED" } else { "FAILED" },
        log.entries.len()
    );
    println!();

    Ok(run)
}

fn print_report(run: &VerificationRun) {
    println!("  Run id:                 {}", run.run_id);
    println!("  Fields compared:        {}", run.total_fields_compared);
    println!("  Match percentage:       {:.1}%", run.match_percentage);
    println!(
        "  Risk:                   {:.2} ({})",
        run.risk_score, run.risk_level
    );
    println!(
        "  Findings:               {} critical / {} major / {} minor",
        run.verification_summary.critical,
        run.verification_summary.major,
        run.verification_summary.minor
    );
    for d in &run.discrepancies {
        println!(
            "    [{}] {}: {} vs {} — {}",
            d.severity,
            d.field,
            d.reference_value.as_deref().unwrap_or("(absent)"),
            d.candidate_value.as_deref().unwrap_or("(absent)"),
            d.rationale
        );
    }
    for factor in &run.risk_factors {
        println!("    risk factor: {}", factor);
    }
}

fn request(candidate: serde_json::Value) -> VerificationRequest {
    VerificationRequest {
        subject_id: "SUBJ-1024".to_string(),
        visit_id: Some("V3".to_string()),
        reference: records::reference_record(),
        candidate,
    }
}

// ── Scenario 1: perfect match ─────────────────────────────────────────────────

/// A faithfully transcribed source document: zero discrepancies, 100.0%
/// match, minimal risk. Weight (lb vs kg) and temperature (°F vs °C) agree
/// once the policy's unit conversions are applied.
pub async fn perfect_match() -> ConcordResult<()> {
    println!("=== Scenario 1: Perfect Match ===");
    println!();
    println!("  Candidate agrees with the reference on every field.");
    println!("  Weight is in lb, temperature in degF; unit conversion applies.");
    println!();

    let engine = default_engine()?;
    let store = InMemoryRunStore::new("demo-perfect-match");
    run_and_record(&engine, &store, &request(records::candidate_matching())).await?;

    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}

// ── Scenario 2: critical vital ────────────────────────────────────────────────

/// Systolic blood pressure transcribed as 190 against a reference of 128.
/// The candidate value sits outside the [90, 180] safe range, so the
/// classifier grades it critical and the run's risk level follows.
pub async fn critical_vital() -> ConcordResult<()> {
    println!("=== Scenario 2: Critical Vital Sign ===");
    println!();
    println!("  Systolic BP reads 190 in the source document (reference: 128).");
    println!();

    let engine = default_engine()?;
    let store = InMemoryRunStore::new("demo-critical-vital");
    let run = run_and_record(&engine, &store, &request(records::candidate_critical_vital())).await?;

    // The out-of-range vital must surface as a critical finding.
    assert!(run.verification_summary.critical >= 1);

    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

// ── Scenario 3: missing medication ────────────────────────────────────────────

/// The source document omits the second medication. Every `medications[1].*`
/// field is present only in the reference, and the categorical medication
/// rule grades each omission major.
pub async fn missing_medication() -> ConcordResult<()> {
    println!("=== Scenario 3: Missing Medication ===");
    println!();
    println!("  The source document lists one medication; the reference lists two.");
    println!();

    let engine = default_engine()?;
    let store = InMemoryRunStore::new("demo-missing-medication");
    let run = run_and_record(
        &engine,
        &store,
        &request(records::candidate_missing_medication()),
    )
    .await?;

    assert!(run.verification_summary.major >= 1);

    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

// ── Scenario 4: classifier fallback ───────────────────────────────────────────

/// A primary classifier that never answers within any reasonable deadline.
///
/// Stands in for an unreachable external reasoning delegate.
struct StalledDelegate;

#[async_trait]
impl SeverityClassifier for StalledDelegate {
    async fn classify(&self, _ctx: &DiscrepancyContext) -> ConcordResult<Classification> {
        sleep(Duration::from_secs(3600)).await;
        unreachable!("the engine's call timeout fires long before this")
    }
}

/// The primary classifier stalls; after the configured timeout and retry the
/// engine degrades to the deterministic rule-based fallback, and every
/// affected rationale says so. The run still completes.
pub async fn classifier_fallback() -> ConcordResult<()> {
    println!("=== Scenario 4: Classifier Fallback ===");
    println!();
    println!("  The primary classifier is unreachable; calls time out at 50 ms.");
    println!("  The rule-based fallback grades every discrepancy instead.");
    println!();

    let policy = clinical_defaults();
    let fallback = Arc::new(RuleBasedClassifier::new(policy.severity.clone()));
    let engine = VerificationEngine::new(policy, Arc::new(StalledDelegate), fallback)?
        .with_limits(ClassifierLimits {
            max_concurrent: 4,
            call_timeout: Duration::from_millis(50),
            retries: 1,
        });

    let store = InMemoryRunStore::new("demo-classifier-fallback");
    let run = run_and_record(&engine, &store, &request(records::candidate_critical_vital())).await?;

    // Every classified discrepancy must carry the fallback marker.
    for d in &run.discrepancies {
        assert!(
            d.rationale.contains("rule-based fallback"),
            "rationale must record the degraded path: {}",
            d.rationale
        );
    }

    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

// ── Run all ───────────────────────────────────────────────────────────────────

/// Run all four scenarios in sequence.
pub async fn run_all() -> ConcordResult<()> {
    perfect_match().await?;
    critical_vital().await?;
    missing_medication().await?;
    classifier_fallback().await?;
    Ok(())
}
