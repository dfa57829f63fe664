//! # Exohab - Habitability Prediction from Host-Star Properties
//!
//! Exohab asks whether a planet's habitability, and its finer habitability
//! class, can be predicted from what we measure about the star it orbits. It
//! trains decision trees on a catalog of confirmed exoplanets and then checks
//! how well they carry over to a catalog of survey candidates they never saw.
//!
//! ## Quick Start
//!
//! ```no_run
//! use exohab::config::PipelineConfig;
//! use exohab::habitability::Pipeline;
//! use std::path::Path;
//!
//! # fn example() -> exohab::error::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let run = pipeline.run_files(
//!     Path::new("phl_hec_all_confirmed.csv"),
//!     Path::new("phl_hec_all_kepler.csv"),
//! )?;
//!
//! for (label, value) in run.accuracy.lines() {
//!     println!("{label}: {value:.4}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`habitability`]: the prediction pipeline
//!   - [`habitability::schema`]: required-column selection and numeric coercion
//!   - [`habitability::scrub`]: sentinel and missing-value removal
//!   - [`habitability::split`]: row-aligned train/test partitioning
//!   - [`habitability::classifier`]: decision tree and majority baseline
//!   - [`habitability::evaluate`]: accuracy
//!   - [`habitability::pipeline`]: the orchestrator
//!   - [`habitability::profile`], [`habitability::charts`]: exploratory summaries
//! - [`config`]: JSON pipeline configuration
//! - [`error`]: error taxonomy
//! - [`logging`]: tracing setup
//!
//! ## Data Flow
//!
//! Both catalogs pass through the *same* schema filter and scrubber so the
//! models see an identical feature layout at training and evaluation time.
//! Catalog-specific quirks, such as a `-` standing in for an unmeasured
//! angular size in the survey catalog, are declared per catalog in
//! [`config::PipelineConfig`] rather than special-cased in code.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod habitability;
pub mod logging;
