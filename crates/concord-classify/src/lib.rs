//! # concord-classify
//!
//! Severity classification for the CONCORD reconciliation engine.
//!
//! This crate provides [`rules::RuleBasedClassifier`], the deterministic
//! implementation of the
//! [`SeverityClassifier`](concord_core::traits::SeverityClassifier) seam.
//! It is the tested, reproducible baseline; a generative or model-backed
//! delegate plugs in behind the same trait as an optional, swappable
//! adapter — the engine substitutes this classifier whenever the delegate
//! times out or fails.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use concord_classify::RuleBasedClassifier;
//!
//! let fallback = Arc::new(RuleBasedClassifier::new(policy.severity.clone()));
//! let engine = VerificationEngine::new(policy, delegate, fallback)?;
//! ```

pub mod rules;

pub use rules::RuleBasedClassifier;
