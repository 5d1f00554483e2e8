//! TOML policy loading.
//!
//! A policy file carries up to three tables, all optional — omitted tables
//! fall back to their defaults:
//!
//! ```toml
//! [[comparison.tolerances]]
//! pattern = "weight*"
//! relative = 0.01
//!
//! [[comparison.unit_conversions]]
//! from = "lb"
//! to = "kg"
//! factor = 0.45359237
//!
//! [[severity.rules]]
//! pattern = "systolic_bp"
//! safe_range = [90.0, 180.0]
//! critical_delta = 40.0
//! major_delta = 15.0
//! category = "vital_sign"
//!
//! [scoring]
//! critical_weight = 1.0
//! major_weight = 0.5
//! minor_weight = 0.15
//! normalizer_divisor = 10.0
//! ```
//!
//! Loading validates the result before handing it back — a policy that
//! parses but carries degenerate entries is rejected here, at configuration
//! time, never mid-run.

use std::path::Path;

use tracing::debug;

use concord_contracts::{
    error::{ConcordError, ConcordResult},
    policy::ConcordPolicy,
};

/// Parse `s` as a TOML policy document and validate it.
///
/// Returns `ConcordError::InvalidPolicy` on malformed TOML or on any
/// degenerate table entry.
pub fn from_toml_str(s: &str) -> ConcordResult<ConcordPolicy> {
    let policy: ConcordPolicy = toml::from_str(s).map_err(|e| ConcordError::InvalidPolicy {
        reason: format!("failed to parse policy TOML: {e}"),
    })?;
    policy.validate()?;

    debug!(
        tolerance_rules = policy.comparison.tolerances.len(),
        unit_conversions = policy.comparison.unit_conversions.len(),
        severity_rules = policy.severity.rules.len(),
        "policy loaded"
    );

    Ok(policy)
}

/// Read the file at `path` and parse it as a TOML policy document.
pub fn from_file(path: &Path) -> ConcordResult<ConcordPolicy> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConcordError::InvalidPolicy {
        reason: format!("failed to read policy file '{}': {e}", path.display()),
    })?;
    from_toml_str(&contents)
}
