//! CONCORD Clinical Record Reconciliation — Demo CLI
//!
//! Runs one or all of the four reconciliation demo scenarios.  Each scenario
//! uses real CONCORD components (clinical default policy, rule-based severity
//! classifier, verification engine, hash-chained run store) wired together
//! with fictional clinical data.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- perfect-match
//!   cargo run -p demo -- critical-vital
//!   cargo run -p demo -- missing-medication
//!   cargo run -p demo -- classifier-fallback

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod records;
mod scenarios;

// ── CLI definition ────────────────────────────────────────────────────────────

/// CONCORD — deterministic clinical record reconciliation demo.
///
/// Each subcommand reconciles a fictional source document against an EDC
/// reference record, demonstrating field flattening, tolerance- and
/// unit-aware comparison, severity classification, risk scoring, and the
/// tamper-evident run log.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CONCORD clinical record reconciliation demo",
    long_about = "Runs CONCORD reconciliation scenarios showing field comparison,\n\
                  severity classification, risk scoring, classifier fallback,\n\
                  and run log chain integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four reconciliation scenarios in sequence.
    RunAll,
    /// Scenario 1: faithfully transcribed record (100% match, minimal risk).
    PerfectMatch,
    /// Scenario 2: out-of-range systolic BP (critical finding).
    CriticalVital,
    /// Scenario 3: medication present only in the reference (major finding).
    MissingMedication,
    /// Scenario 4: stalled primary classifier, rule-based fallback engages.
    ClassifierFallback,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => scenarios::run_all().await,
        Command::PerfectMatch => scenarios::perfect_match().await,
        Command::CriticalVital => scenarios::critical_vital().await,
        Command::MissingMedication => scenarios::missing_medication().await,
        Command::ClassifierFallback => scenarios::classifier_fallback().await,
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("CONCORD — Clinical Record Reconciliation");
    println!("Risk-Scoring Demo");
    println!("========================================");
    println!();
    println!("CONCORD pipeline per run:");
    println!("  [1] Flatten both records into dot-path field maps");
    println!("  [2] Compare field-by-field under tolerance and unit policy");
    println!("  [3] Classify each discrepancy (bounded fan-out, timeout, fallback)");
    println!("  [4] Aggregate into match %, risk score, and risk level");
    println!("  [5] Immutable report appended to a SHA-256 hash-chained run log");
    println!();
}
