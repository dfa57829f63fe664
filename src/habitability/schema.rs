//! Schema filter: narrow a raw table to the columns the pipeline uses.

use crate::error::{HabitabilityError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Return a table holding exactly `required`, in that order, with row order
/// preserved. Any absent column is a [`HabitabilityError::Schema`] error.
pub fn select_required(df: &DataFrame, table: &str, required: &[String]) -> Result<DataFrame> {
    for column in required {
        if df.get_column_index(column).is_none() {
            tracing::error!("Column '{}' missing from {} table", column, table);
            return Err(HabitabilityError::Schema {
                table: table.to_owned(),
                column: column.clone(),
            });
        }
    }

    Ok(df.select(required.iter().map(String::as_str))?)
}

/// Cast every column in `columns` to `Float64`.
///
/// Text that does not parse as a number is a data-quality failure naming the
/// column and the first offending value. Nulls pass through untouched.
pub fn coerce_numeric(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut df = df.clone();

    for name in columns {
        let series = df.column(name)?.as_materialized_series().clone();
        if series.dtype() == &DataType::Float64 {
            continue;
        }

        let cast = series.cast(&DataType::Float64)?;
        if series.dtype() == &DataType::String {
            let bad = series
                .str()?
                .into_iter()
                .zip(cast.f64()?.into_iter())
                .find(|(raw, parsed)| raw.is_some() && parsed.is_none())
                .and_then(|(raw, _)| raw);
            if let Some(value) = bad {
                return Err(HabitabilityError::DataQuality {
                    column: name.clone(),
                    message: format!("non-numeric value '{value}' in a numeric column"),
                });
            }
        } else if cast.null_count() > series.null_count() {
            return Err(HabitabilityError::DataQuality {
                column: name.clone(),
                message: format!("cannot interpret {} values as numbers", series.dtype()),
            });
        }

        tracing::debug!("Coerced '{}' from {} to f64", name, series.dtype());
        df.with_column(cast)?;
    }

    Ok(df)
}

/// Build the row-major feature matrix from null-free numeric columns.
pub fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut matrix = Array2::<f64>::zeros((df.height(), columns.len()));

    for (j, name) in columns.iter().enumerate() {
        let series = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        if series.null_count() > 0 {
            return Err(HabitabilityError::DataQuality {
                column: name.clone(),
                message: "feature column still holds missing values".to_owned(),
            });
        }
        let values: Array1<f64> = series.f64()?.into_no_null_iter().collect();
        matrix.column_mut(j).assign(&values);
    }

    Ok(matrix)
}
