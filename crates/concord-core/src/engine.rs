//! The verification engine: one request in, one frozen report out.
//!
//! The pipeline per run:
//!
//!   flatten both records → compare → classify each discrepancy (bounded
//!   fan-out) → aggregate → build report
//!
//! Runs are self-contained and share no mutable state, so callers may
//! execute any number of them in parallel. The only suspension point is the
//! classifier fan-out: each call is bounded by a semaphore, carries its own
//! deadline, gets one retry, and falls back to the deterministic classifier
//! on failure — a classifier outage degrades rationale text, never the run.
//! Nothing is spawned, so dropping the `verify` future cancels every
//! outstanding classification and no partial run is ever observable.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use concord_contracts::{
    discrepancy::{Classification, DiscrepancyContext, DomainHints, Severity},
    error::ConcordResult,
    policy::ConcordPolicy,
    run::VerificationRun,
};

use crate::{
    aggregate::aggregate,
    compare::compare,
    flatten::flatten,
    report::build_report,
    traits::SeverityClassifier,
};

/// Bounds on the external classifier fan-out.
#[derive(Debug, Clone)]
pub struct ClassifierLimits {
    /// Maximum classifier calls in flight at once.
    pub max_concurrent: usize,
    /// Deadline for a single classifier call.
    pub call_timeout: Duration,
    /// Retries of the primary classifier before falling back (the overall
    /// pipeline is never retried).
    pub retries: u32,
}

impl Default for ClassifierLimits {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            call_timeout: Duration::from_secs(10),
            retries: 1,
        }
    }
}

/// A single verification request: two records plus subject identifiers.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub subject_id: String,
    pub visit_id: Option<String>,
    /// The EDC/system-of-record version.
    pub reference: serde_json::Value,
    /// The source-document version being checked.
    pub candidate: serde_json::Value,
}

/// The reconciliation engine.
///
/// Owns the validated policy bundle and the two classifier seams: `primary`
/// (possibly an external reasoning delegate) and `fallback` (deterministic,
/// always available — typically the bundled rule-based classifier).
pub struct VerificationEngine {
    policy: ConcordPolicy,
    primary: Arc<dyn SeverityClassifier>,
    fallback: Arc<dyn SeverityClassifier>,
    limits: ClassifierLimits,
}

impl VerificationEngine {
    /// Build an engine over a policy bundle and classifier pair.
    ///
    /// Validates the policy up front — a malformed table is rejected here,
    /// at startup, never mid-run.
    pub fn new(
        policy: ConcordPolicy,
        primary: Arc<dyn SeverityClassifier>,
        fallback: Arc<dyn SeverityClassifier>,
    ) -> ConcordResult<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            primary,
            fallback,
            limits: ClassifierLimits::default(),
        })
    }

    /// Override the fan-out limits.
    pub fn with_limits(mut self, limits: ClassifierLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The policy bundle this engine runs under.
    pub fn policy(&self) -> &ConcordPolicy {
        &self.policy
    }

    /// Execute one verification run.
    ///
    /// Fails only on malformed input records; every classifier-side failure
    /// is isolated to its single discrepancy.
    pub async fn verify(&self, request: &VerificationRequest) -> ConcordResult<VerificationRun> {
        let reference = flatten(&request.reference)?;
        let candidate = flatten(&request.candidate)?;

        let total_fields = reference
            .keys()
            .chain(candidate.keys())
            .collect::<BTreeSet<_>>()
            .len();

        let raw = compare(&reference, &candidate, &self.policy.comparison);

        debug!(
            subject_id = %request.subject_id,
            total_fields,
            discrepancy_count = raw.len(),
            "comparison finished, classifying discrepancies"
        );

        // Bounded fan-out. join_all polls the futures concurrently without
        // spawning, which preserves discovery order in the gathered output
        // and ties every classification's lifetime to this future.
        let semaphore = Arc::new(Semaphore::new(self.limits.max_concurrent.max(1)));
        let classifications = join_all(raw.iter().map(|discrepancy| {
            let semaphore = Arc::clone(&semaphore);
            let ctx = DiscrepancyContext::from_raw(discrepancy, self.hints_for(&discrepancy.field));
            async move {
                let _permit = semaphore.acquire().await.ok();
                self.classify_one(&ctx).await
            }
        }))
        .await;

        let classified: Vec<_> = raw.into_iter().zip(classifications).collect();
        let aggregation = aggregate(total_fields, &classified, &self.policy.scoring);

        Ok(build_report(
            &request.subject_id,
            request.visit_id.as_deref(),
            total_fields,
            classified,
            aggregation,
        ))
    }

    /// Domain hints for one field, resolved from the severity policy.
    fn hints_for(&self, field: &str) -> Option<DomainHints> {
        self.policy.severity.rule_for(field).map(|rule| DomainHints {
            normal_range: rule.safe_range,
            category: rule.category.clone(),
        })
    }

    /// Classify one discrepancy: primary with deadline and one retry, then
    /// the deterministic fallback.
    ///
    /// Never returns an error — per-discrepancy classification failure must
    /// not abort aggregation.
    async fn classify_one(&self, ctx: &DiscrepancyContext) -> Classification {
        let attempts = self.limits.retries.saturating_add(1);

        for attempt in 1..=attempts {
            match timeout(self.limits.call_timeout, self.primary.classify(ctx)).await {
                Ok(Ok(classification)) => return classification,
                Ok(Err(error)) => {
                    warn!(
                        field = %ctx.field,
                        attempt,
                        %error,
                        "classifier call failed"
                    );
                }
                Err(_elapsed) => {
                    warn!(
                        field = %ctx.field,
                        attempt,
                        timeout_ms = self.limits.call_timeout.as_millis() as u64,
                        "classifier call timed out"
                    );
                }
            }
        }

        match self.fallback.classify(ctx).await {
            Ok(mut classification) => {
                classification.rationale = format!(
                    "classification unavailable, rule-based fallback used: {}",
                    classification.rationale
                );
                classification
            }
            Err(error) => {
                // Last resort: the run still completes with an explicit
                // low-confidence verdict for this field.
                warn!(field = %ctx.field, %error, "fallback classifier failed");
                Classification {
                    severity: Severity::Minor,
                    confidence: 0.0,
                    rationale: format!("classification unavailable for this field: {error}"),
                    recommended_action: None,
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
