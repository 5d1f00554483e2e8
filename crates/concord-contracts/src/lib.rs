//! # concord-contracts
//!
//! Shared types, policy tables, and error contracts for the CONCORD
//! clinical record reconciliation engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, policy tables, and error types.

pub mod discrepancy;
pub mod error;
pub mod policy;
pub mod record;
pub mod run;
