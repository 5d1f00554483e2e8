//! # concord-policy
//!
//! TOML-driven policy loading for the CONCORD reconciliation engine.
//!
//! ## Overview
//!
//! The engine's behavior is governed by three explicit tables — comparison
//! tolerances and unit conversions, the clinical severity reference, and the
//! scoring weights. This crate deserializes them from TOML, validates every
//! entry at load time, and ships a reviewed built-in clinical table for
//! demos and tests.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! let policy = concord_policy::from_file(Path::new("policies/study-42.toml"))?;
//! let engine = VerificationEngine::new(policy, delegate, fallback)?;
//! ```

pub mod builtin;
pub mod load;

pub use builtin::clinical_defaults;
pub use load::{from_file, from_toml_str};

// ── Tests ─────────────────────────────────────────────────────────────────────
