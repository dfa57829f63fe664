//! Sentinel scrubber.
//!
//! Rows are removed in a fixed order:
//!
//! 1. rows whose designated column holds a registered sentinel (e.g. `-`),
//! 2. numeric columns are coerced to `f64`,
//! 3. rows with a missing value (null, or `NaN`) in any column.
//!
//! Sentinels go first so a placeholder never reaches a numeric comparison or
//! the model; it is rejected as a data-quality issue instead.

use crate::error::{HabitabilityError, Result};
use polars::prelude::*;

use super::schema::coerce_numeric;
use super::types::{ScrubReport, Sentinel};

/// Drop every row whose `sentinel.column` equals `sentinel.value`.
///
/// Only text columns can hold a textual placeholder; for any other dtype the
/// table is returned unchanged.
pub fn drop_sentinel(df: &DataFrame, table: &str, sentinel: &Sentinel) -> Result<DataFrame> {
    if df.get_column_index(&sentinel.column).is_none() {
        return Err(HabitabilityError::Schema {
            table: table.to_owned(),
            column: sentinel.column.clone(),
        });
    }
    let series = df.column(&sentinel.column)?.as_materialized_series();

    if series.dtype() != &DataType::String {
        tracing::debug!(
            "Column '{}' is {}, no '{}' sentinel possible",
            sentinel.column,
            series.dtype(),
            sentinel.value
        );
        return Ok(df.clone());
    }

    let marker = sentinel.value.trim();
    let keep: Vec<bool> = series
        .str()?
        .into_iter()
        .map(|v| v.map(str::trim) != Some(marker))
        .collect();

    Ok(df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?)
}

/// Drop rows with a null in any column or a `NaN` in any float column.
pub fn drop_missing(df: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        for (k, is_null) in keep.iter_mut().zip(series.is_null().into_iter()) {
            if is_null.unwrap_or(true) {
                *k = false;
            }
        }
        if series.dtype().is_float() {
            for (k, is_nan) in keep.iter_mut().zip(series.is_nan()?.into_iter()) {
                if is_nan.unwrap_or(false) {
                    *k = false;
                }
            }
        }
    }

    Ok(df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?)
}

/// Column with the most missing values, used to name an emptied table.
fn worst_column(df: &DataFrame) -> String {
    df.get_columns()
        .iter()
        .max_by_key(|c| c.null_count())
        .map(|c| c.name().to_string())
        .unwrap_or_default()
}

/// Run the full scrub: sentinels, numeric coercion, then missing values.
///
/// Fails with [`HabitabilityError::DataQuality`] when nothing survives, since
/// an empty table can neither train nor evaluate a model.
pub fn scrub(
    df: &DataFrame,
    table: &str,
    sentinels: &[Sentinel],
    numeric_columns: &[String],
) -> Result<(DataFrame, ScrubReport)> {
    let mut report = ScrubReport {
        rows_in: df.height(),
        ..Default::default()
    };

    let mut current = df.clone();
    for sentinel in sentinels {
        let before = current.height();
        current = drop_sentinel(&current, table, sentinel)?;
        let dropped = before - current.height();
        if dropped > 0 {
            tracing::info!(
                "{}: dropped {} rows with '{}' in '{}'",
                table,
                dropped,
                sentinel.value,
                sentinel.column
            );
        }
        report.sentinel_drops.push((sentinel.column.clone(), dropped));
    }

    let coerced = coerce_numeric(&current, numeric_columns)?;
    let before = coerced.height();
    let scrubbed = drop_missing(&coerced)?;
    report.missing_drops = before - scrubbed.height();
    report.rows_out = scrubbed.height();

    if scrubbed.height() == 0 {
        return Err(HabitabilityError::DataQuality {
            column: worst_column(&coerced),
            message: format!("no rows left in {table} table after scrubbing"),
        });
    }

    tracing::info!("{}: {}", table, report.summary());
    Ok((scrubbed, report))
}
