//! Error taxonomy for the habitability pipeline.
//!
//! Every failure in the pipeline is fatal. The variants map onto the three
//! data-level failure classes plus the plumbing errors underneath them:
//!
//! - [`HabitabilityError::Schema`]: a required column is absent from a table.
//! - [`HabitabilityError::DataQuality`]: a column holds values the model cannot
//!   use, or nothing survives scrubbing.
//! - [`HabitabilityError::LengthMismatch`]: the evaluator received misaligned
//!   label sequences. This signals an upstream bug, never bad input.
//!
//! The orchestrator wraps whatever a stage returns in
//! [`HabitabilityError::Stage`] so the final message names both the stage and
//! the offending column:
//!
//! ```
//! use exohab::error::HabitabilityError;
//! use exohab::habitability::PipelineStage;
//!
//! let err = HabitabilityError::Stage {
//!     stage: PipelineStage::Filter,
//!     source: Box::new(HabitabilityError::Schema {
//!         table: "generalization".to_owned(),
//!         column: "S. Mass (SU)".to_owned(),
//!     }),
//! };
//! assert!(err.to_string().contains("filter"));
//! assert!(err.to_string().contains("S. Mass (SU)"));
//! ```

use std::fmt;

use crate::habitability::PipelineStage;

/// Main error type for pipeline operations.
#[derive(Debug)]
pub enum HabitabilityError {
    /// A required column is missing from a table
    Schema { table: String, column: String },

    /// A column contains unusable values, or no rows survive scrubbing
    DataQuality { column: String, message: String },

    /// Predicted and true label sequences differ in length
    LengthMismatch { expected: usize, actual: usize },

    /// A label value is outside the configured vocabulary
    UnknownLabel { column: String, value: String },

    /// A pipeline stage failed
    Stage {
        stage: PipelineStage,
        source: Box<HabitabilityError>,
    },

    /// I/O errors
    Io(std::io::Error),

    /// Polars errors
    DataProcessing(String),

    /// Model fitting or prediction errors
    Model(String),

    /// Invalid configuration
    Config(String),
}

impl fmt::Display for HabitabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema { table, column } => {
                write!(f, "Schema error: required column '{column}' not found in {table} table")
            }
            Self::DataQuality { column, message } => {
                write!(f, "Data quality error in column '{column}': {message}")
            }
            Self::LengthMismatch { expected, actual } => write!(
                f,
                "Length mismatch: expected {expected} predictions, got {actual}"
            ),
            Self::UnknownLabel { column, value } => {
                write!(f, "Unknown label '{value}' in column '{column}'")
            }
            Self::Stage { stage, source } => write!(f, "Stage '{stage}' failed: {source}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Model(msg) => write!(f, "Model error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for HabitabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl HabitabilityError {
    /// Strip any stage wrappers and return the underlying error.
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<std::io::Error> for HabitabilityError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<polars::error::PolarsError> for HabitabilityError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<serde_json::Error> for HabitabilityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, HabitabilityError>;

/// Extension trait to tag a failure with the pipeline stage it came from.
pub trait ResultExt<T> {
    fn in_stage(self, stage: PipelineStage) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<HabitabilityError>,
{
    fn in_stage(self, stage: PipelineStage) -> Result<T> {
        self.map_err(|e| HabitabilityError::Stage {
            stage,
            source: Box::new(e.into()),
        })
    }
}
