//! Pipeline configuration.
//!
//! Everything the pipeline needs to know about column names, label
//! vocabularies, the held-out fraction and catalog-specific sentinel markers
//! lives here. Configurations are plain JSON; any field left out falls back to
//! the defaults for the PHL exoplanet catalogs.

use crate::error::{HabitabilityError, Result};
use crate::habitability::types::Sentinel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

pub const DEFAULT_FEATURE_COLUMNS: [&str; 9] = [
    "S. Mass (SU)",
    "S. Radius (SU)",
    "S. Teff (K)",
    "S. Luminosity (SU)",
    "S. Age (Gyrs)",
    "S. RA (hrs)",
    "S. DEC (deg)",
    "S. Mag from Planet",
    "S. Size from Planet (deg)",
];

pub const DEFAULT_HABITABLE_COLUMN: &str = "P. Habitable";
pub const DEFAULT_CLASS_COLUMN: &str = "P. Habitable Class";
pub const DEFAULT_STAR_TYPE_COLUMN: &str = "S. Type";
pub const NON_HABITABLE_CLASS: &str = "non-habitable";

pub const DEFAULT_CLASS_ORDER: [&str; 5] = [
    NON_HABITABLE_CLASS,
    "hypopsychroplanet",
    "psychroplanet",
    "mesoplanet",
    "thermoplanet",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Numeric stellar features, in matrix column order
    pub feature_columns: Vec<String>,

    /// Binary habitability flag
    pub habitable_column: String,

    /// Categorical habitability class
    pub class_column: String,

    /// Vocabulary of the class column; index order is the class index
    pub class_order: Vec<String>,

    /// Vocabulary of the habitability flag
    pub habitable_values: Vec<String>,

    /// Fraction of the training catalog held out for testing, in (0, 1)
    pub test_fraction: f64,

    /// Seed for the split engine; `None` draws from entropy
    pub seed: Option<u64>,

    /// Placeholder markers to scrub from the training catalog
    pub training_sentinels: Vec<Sentinel>,

    /// Placeholder markers to scrub from the generalization catalog
    pub generalization_sentinels: Vec<Sentinel>,

    /// Tree depth limit, unlimited when `None`
    pub max_depth: Option<usize>,

    /// Minimum samples needed to split a node
    pub min_samples_split: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feature_columns: DEFAULT_FEATURE_COLUMNS.map(str::to_owned).to_vec(),
            habitable_column: DEFAULT_HABITABLE_COLUMN.to_owned(),
            class_column: DEFAULT_CLASS_COLUMN.to_owned(),
            class_order: DEFAULT_CLASS_ORDER.map(str::to_owned).to_vec(),
            habitable_values: vec!["0".to_owned(), "1".to_owned()],
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: None,
            training_sentinels: Vec::new(),
            generalization_sentinels: vec![Sentinel::new("S. Size from Planet (deg)", "-")],
            max_depth: None,
            min_samples_split: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse and validate a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every column the pipeline reads: features first, then both labels.
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns = self.feature_columns.clone();
        columns.push(self.habitable_column.clone());
        columns.push(self.class_column.clone());
        columns
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(HabitabilityError::Config(format!(
                "test_fraction must lie strictly between 0 and 1, got {}",
                self.test_fraction
            )));
        }

        if self.feature_columns.is_empty() {
            return Err(HabitabilityError::Config(
                "at least one feature column is required".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.feature_columns {
            if !seen.insert(column.as_str()) {
                return Err(HabitabilityError::Config(format!(
                    "feature column '{column}' is listed twice"
                )));
            }
        }

        for label in [&self.habitable_column, &self.class_column] {
            if seen.contains(label.as_str()) {
                return Err(HabitabilityError::Config(format!(
                    "label column '{label}' is also listed as a feature"
                )));
            }
        }

        if self.habitable_column == self.class_column {
            return Err(HabitabilityError::Config(
                "habitable_column and class_column must differ".to_owned(),
            ));
        }

        if self.class_order.is_empty() || self.habitable_values.is_empty() {
            return Err(HabitabilityError::Config(
                "label vocabularies must not be empty".to_owned(),
            ));
        }

        Ok(())
    }
}
