//! Exploratory summaries of a raw catalog.

use crate::error::{HabitabilityError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Planets orbiting one broad spectral class of star.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarClassCount {
    /// Leading letter of the spectral type, e.g. `G` for `G2 V`
    pub class: String,
    pub planets: usize,
    pub habitable: usize,
}

fn require<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Series> {
    if df.get_column_index(column).is_none() {
        return Err(HabitabilityError::Schema {
            table: "profile".to_owned(),
            column: column.to_owned(),
        });
    }
    Ok(df.column(column)?.as_materialized_series())
}

/// Split a table into `(habitable, non_habitable)` rows by habitability class.
///
/// A row is non-habitable only when its class equals `non_habitable`; rows
/// with any other class, including a missing one, land on the habitable side.
pub fn partition_by_habitability(
    df: &DataFrame,
    class_column: &str,
    non_habitable: &str,
) -> Result<(DataFrame, DataFrame)> {
    let classes = require(df, class_column)?.cast(&DataType::String)?;
    let is_non: Vec<bool> = classes
        .str()?
        .into_iter()
        .map(|v| v == Some(non_habitable))
        .collect();
    let is_hab: Vec<bool> = is_non.iter().map(|b| !b).collect();

    let habitable = df.filter(&BooleanChunked::from_slice("mask".into(), &is_hab))?;
    let non = df.filter(&BooleanChunked::from_slice("mask".into(), &is_non))?;
    Ok((habitable, non))
}

/// Tally planets per spectral class letter, sorted by letter.
///
/// `planets` counts every row with a star type; `habitable` sums the
/// habitability flag over rows where both the type and the flag are present.
pub fn star_class_counts(
    df: &DataFrame,
    type_column: &str,
    habitable_column: &str,
) -> Result<Vec<StarClassCount>> {
    let types = require(df, type_column)?.cast(&DataType::String)?;
    let flags = require(df, habitable_column)?.cast(&DataType::Float64)?;

    let mut tally: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for (star_type, flag) in types.str()?.into_iter().zip(flags.f64()?.into_iter()) {
        let Some(letter) = star_type.and_then(|t| t.trim().chars().next()) else {
            continue;
        };
        let entry = tally.entry(letter.to_string()).or_default();
        entry.0 += 1;
        if flag.is_some_and(|f| f > 0.0) {
            entry.1 += 1;
        }
    }

    Ok(tally
        .into_iter()
        .map(|(class, (planets, habitable))| StarClassCount {
            class,
            planets,
            habitable,
        })
        .collect())
}
