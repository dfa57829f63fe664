use crate::error::{HabitabilityError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// DATA STRUCTURES

/// Which of the two catalogs a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Confirmed exoplanets, used for fitting and the internal hold-out test
    Training,
    /// Survey candidates, used only for evaluation
    Generalization,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Generalization => "generalization",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An observation table tagged with its origin. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub kind: CatalogKind,
    pub frame: DataFrame,
}

impl Catalog {
    pub fn new(kind: CatalogKind, frame: DataFrame) -> Self {
        Self { kind, frame }
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// A non-numeric placeholder standing in for "not measured" in a numeric column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sentinel {
    pub column: String,
    pub value: String,
}

impl Sentinel {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// The two classification tasks run per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Binary habitability flag
    Habitability,
    /// Fine-grained habitability class
    HabitableClass,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Habitability => "habitability",
            Self::HabitableClass => "habitable class",
        }
    }
}

/// Row accounting for one pass of the sentinel scrubber.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubReport {
    pub rows_in: usize,
    /// Rows dropped per sentinel column, in sentinel order
    pub sentinel_drops: Vec<(String, usize)>,
    pub missing_drops: usize,
    pub rows_out: usize,
}

impl ScrubReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }

    pub fn summary(&self) -> String {
        let sentinel_total: usize = self.sentinel_drops.iter().map(|(_, n)| n).sum();
        format!(
            "{} rows in, {} dropped for sentinels, {} dropped for missing values, {} rows out",
            self.rows_in, sentinel_total, self.missing_drops, self.rows_out
        )
    }
}

/// Row-aligned partition of a filtered table into train and test subsets.
///
/// Row `i` of `train_features` and `train_labels` always come from source row
/// `train_rows[i]`; the same holds for the test side.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_features: Array2<f64>,
    pub test_features: Array2<f64>,
    pub train_labels: Array1<usize>,
    pub test_labels: Array1<usize>,
    pub train_rows: Vec<usize>,
    pub test_rows: Vec<usize>,
}

impl TrainTestSplit {
    pub fn train_count(&self) -> usize {
        self.train_rows.len()
    }

    pub fn test_count(&self) -> usize {
        self.test_rows.len()
    }
}

/// The four figures reported by a pipeline run, each a fraction in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub habitability_holdout: f64,
    pub habitability_generalization: f64,
    pub class_holdout: f64,
    pub class_generalization: f64,
}

impl AccuracyReport {
    pub fn lines(&self) -> [(&'static str, f64); 4] {
        [
            (
                "Confirmed Exoplanet Habitability Accuracy Score",
                self.habitability_holdout,
            ),
            (
                "Generalization Catalog Habitability Accuracy Score",
                self.habitability_generalization,
            ),
            (
                "Confirmed Exoplanet Habitable Class Accuracy Score",
                self.class_holdout,
            ),
            (
                "Generalization Catalog Habitable Class Accuracy Score",
                self.class_generalization,
            ),
        ]
    }
}

/// Maps label values to dense class indices through a fixed vocabulary.
///
/// Numeric labels are normalised before lookup so a flag read as `1.0` from
/// one file and `1` from another land on the same class.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(classes: &[String]) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            classes: classes.to_vec(),
            index,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn decode(&self, class: usize) -> Option<&str> {
        self.classes.get(class).map(String::as_str)
    }

    /// Index given to labels outside the vocabulary by [`Self::encode_lenient`].
    ///
    /// No model fitted on this vocabulary can predict it.
    pub fn unseen_class(&self) -> usize {
        self.classes().len()
    }

    fn normalised(column: &Column) -> Result<Vec<String>> {
        let name = column.name().to_string();
        let series = column.as_materialized_series();
        let text = if series.dtype().is_float() {
            // 1.0 -> "1"; integral floats only, anything else stays as written
            let floats = series.cast(&DataType::Float64)?;
            floats
                .f64()?
                .into_iter()
                .map(|v| {
                    v.map(|x| {
                        if x.fract() == 0.0 && x.is_finite() {
                            format!("{x:.0}")
                        } else {
                            x.to_string()
                        }
                    })
                })
                .collect::<Vec<_>>()
        } else {
            let cast = series.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.trim().to_owned()))
                .collect::<Vec<_>>()
        };

        text.into_iter()
            .map(|value| {
                value.ok_or_else(|| HabitabilityError::DataQuality {
                    column: name.clone(),
                    message: "label column contains a missing value".to_owned(),
                })
            })
            .collect()
    }

    /// Encode every value of a null-free label column.
    ///
    /// A value outside the vocabulary is an [`HabitabilityError::UnknownLabel`].
    pub fn encode(&self, column: &Column) -> Result<Array1<usize>> {
        Self::normalised(column)?
            .into_iter()
            .map(|value| {
                self.index
                    .get(&value)
                    .copied()
                    .ok_or_else(|| HabitabilityError::UnknownLabel {
                        column: column.name().to_string(),
                        value,
                    })
            })
            .collect()
    }

    /// Like [`Self::encode`], but values outside the vocabulary become
    /// [`Self::unseen_class`] so they always score as misses.
    ///
    /// Returns the encoded labels and how many were unseen.
    pub fn encode_lenient(&self, column: &Column) -> Result<(Array1<usize>, usize)> {
        let unseen = self.unseen_class();
        let mut unseen_count = 0;
        let labels = Self::normalised(column)?
            .into_iter()
            .map(|value| {
                self.index.get(&value).copied().unwrap_or_else(|| {
                    unseen_count += 1;
                    unseen
                })
            })
            .collect();
        Ok((labels, unseen_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_normalises_numeric_flags() -> anyhow::Result<()> {
        let encoder = LabelEncoder::new(&["0".to_owned(), "1".to_owned()]);

        let ints = Column::new("flag".into(), &[0i64, 1, 1]);
        assert_eq!(encoder.encode(&ints)?.to_vec(), vec![0, 1, 1]);

        let floats = Column::new("flag".into(), &[1.0f64, 0.0]);
        assert_eq!(encoder.encode(&floats)?.to_vec(), vec![1, 0]);
        Ok(())
    }

    #[test]
    fn test_encoder_rejects_unknown_label() {
        let encoder = LabelEncoder::new(&["mesoplanet".to_owned()]);
        let column = Column::new("class".into(), &["mesoplanet", "hyperplanet"]);
        let err = encoder.encode(&column).unwrap_err();
        assert!(matches!(
            err,
            HabitabilityError::UnknownLabel { ref value, .. } if value == "hyperplanet"
        ));
    }

    #[test]
    fn test_lenient_encoding_marks_unseen_labels() -> anyhow::Result<()> {
        let classes = vec!["non-habitable".to_owned(), "mesoplanet".to_owned()];
        let encoder = LabelEncoder::new(&classes);
        let column = Column::new(
            "class".into(),
            &["mesoplanet", "hyperthermoplanet", "non-habitable"],
        );

        let (labels, unseen) = encoder.encode_lenient(&column)?;
        assert_eq!(labels.to_vec(), vec![1, 2, 0]);
        assert_eq!(unseen, 1);
        assert_eq!(encoder.unseen_class(), encoder.classes().len());
        assert_eq!(encoder.decode(1), Some("mesoplanet"));
        assert_eq!(encoder.decode(encoder.unseen_class()), None);
        Ok(())
    }

    #[test]
    fn test_scrub_report_summary() {
        let report = ScrubReport {
            rows_in: 10,
            sentinel_drops: vec![("size".to_owned(), 1)],
            missing_drops: 2,
            rows_out: 7,
        };
        assert_eq!(report.rows_dropped(), 3);
        assert!(report.summary().contains("1 dropped for sentinels"));
    }
}
