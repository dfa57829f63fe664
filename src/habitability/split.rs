use crate::error::{HabitabilityError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::seq::SliceRandom as _;

use super::types::TrainTestSplit;

/// Number of rows held out for `n` rows at fraction `f`.
///
/// Rounded up, then clamped so both sides keep at least one row.
pub fn test_size(n: usize, test_fraction: f64) -> usize {
    let raw = (n as f64 * test_fraction).ceil() as usize;
    raw.clamp(1, n.saturating_sub(1).max(1))
}

/// Shuffle row indices and cut them into `(train, test)` index sets.
pub fn split_indices<R: Rng + ?Sized>(
    n: usize,
    test_fraction: f64,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(HabitabilityError::Config(format!(
            "test fraction must lie strictly between 0 and 1, got {test_fraction}"
        )));
    }
    if n < 2 {
        return Err(HabitabilityError::DataQuality {
            column: String::new(),
            message: format!("need at least 2 rows to split, got {n}"),
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let test = indices.split_off(n - test_size(n, test_fraction));
    Ok((indices, test))
}

/// Partition a feature matrix and its labels into aligned train/test subsets.
///
/// Features and labels are gathered through the same index lists, so row `i`
/// on either side always refers to one source observation.
pub fn train_test_split<R: Rng + ?Sized>(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    test_fraction: f64,
    rng: &mut R,
) -> Result<TrainTestSplit> {
    if features.nrows() != labels.len() {
        return Err(HabitabilityError::LengthMismatch {
            expected: features.nrows(),
            actual: labels.len(),
        });
    }

    let (train_rows, test_rows) = split_indices(features.nrows(), test_fraction, rng)?;

    tracing::debug!(
        "Split {} rows into {} train / {} test",
        features.nrows(),
        train_rows.len(),
        test_rows.len()
    );

    Ok(TrainTestSplit {
        train_features: features.select(Axis(0), &train_rows),
        test_features: features.select(Axis(0), &test_rows),
        train_labels: labels.select(Axis(0), &train_rows),
        test_labels: labels.select(Axis(0), &test_rows),
        train_rows,
        test_rows,
    })
}
