//! # Exohab Entry Point
//!
//! ```text
//! main()
//!   │
//!   ├─> Initialize tracing (console + rolling file)
//!   ├─> Parse CLI arguments (clap)
//!   └─> Load ──> Filter ──> Split ──> Fit ──> Evaluate ──> print four accuracies
//! ```
//!
//! ```bash
//! exohab --training phl_hec_all_confirmed.csv --generalization phl_hec_all_kepler.csv --seed 42
//! ```
//!
//! Any failure is printed with the stage it happened in and the process exits
//! with a non-zero status.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)] // Allow console output in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    // Set RUST_LOG=debug to see per-step row counts
    if let Err(e) = exohab::logging::init(false) {
        eprintln!("Logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();
    if let Err(e) = cli::run(&cli) {
        tracing::error!("{e:#}");
        return Err(e);
    }
    Ok(())
}
