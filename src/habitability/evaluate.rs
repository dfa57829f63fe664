use crate::error::{HabitabilityError, Result};
use ndarray::Array1;

use super::classifier::majority_class;

/// Fraction of positions where `predicted` equals `truth`.
///
/// Sequences of different length mean rows were misaligned upstream; that is
/// reported as [`HabitabilityError::LengthMismatch`] and never recovered.
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> Result<f64> {
    if truth.len() != predicted.len() {
        return Err(HabitabilityError::LengthMismatch {
            expected: truth.len(),
            actual: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Err(HabitabilityError::DataQuality {
            column: String::new(),
            message: "cannot score an empty label set".to_owned(),
        });
    }

    let hits = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    Ok(hits as f64 / truth.len() as f64)
}

pub fn accuracy_score(truth: &Array1<usize>, predicted: &Array1<usize>) -> Result<f64> {
    accuracy(&truth.to_vec(), &predicted.to_vec())
}

/// Accuracy of always predicting the most frequent label in `labels`.
pub fn majority_baseline_accuracy(labels: &Array1<usize>) -> Result<f64> {
    let class = majority_class(labels).ok_or_else(|| HabitabilityError::DataQuality {
        column: String::new(),
        message: "cannot score an empty label set".to_owned(),
    })?;
    let hits = labels.iter().filter(|&&l| l == class).count();
    Ok(hits as f64 / labels.len() as f64)
}
