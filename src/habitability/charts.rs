//! Chart data for the exploratory plots.
//!
//! Rendering happens elsewhere; this module turns a uniform list of
//! [`ChartRequest`]s into the exact table each chart would draw, and can write
//! those tables out as CSV for a plotting tool to pick up.

use crate::config::{NON_HABITABLE_CLASS, PipelineConfig};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::io::save_df;
use super::profile::{partition_by_habitability, star_class_counts};
use super::scrub::drop_missing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Categorical x against numeric y, one point per row
    Swarm,
    /// Numeric x against numeric y, optionally coloured by a group
    Scatter,
    /// Rows (or a summed y) per category of x
    Bar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subset {
    #[default]
    All,
    Habitable,
    NonHabitable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub name: String,
    pub kind: ChartKind,
    pub x: String,
    pub y: Option<String>,
    pub group: Option<String>,
    #[serde(default)]
    pub subset: Subset,
}

/// The swarm and scatter plots of host-star properties by habitability class.
pub fn default_chart_requests(config: &PipelineConfig) -> Vec<ChartRequest> {
    let properties = [
        ("s_mass", "S. Mass (SU)"),
        ("s_radius", "S. Radius (SU)"),
        ("s_teff", "S. Teff (K)"),
        ("s_luminosity", "S. Luminosity (SU)"),
        ("s_feh", "S. [Fe/H]"),
        ("s_age", "S. Age (Gyrs)"),
        ("s_mag_from_planet", "S. Mag from Planet"),
        ("s_size_from_planet", "S. Size from Planet (deg)"),
    ];

    let mut requests = Vec::new();
    for (stem, column) in properties {
        for (suffix, subset) in [("h", Subset::Habitable), ("nh", Subset::NonHabitable)] {
            requests.push(ChartRequest {
                name: format!("{stem}_{suffix}"),
                kind: ChartKind::Swarm,
                x: config.class_column.clone(),
                y: Some(column.to_owned()),
                group: None,
                subset,
            });
        }
    }

    for (suffix, subset) in [("all", Subset::All), ("h", Subset::Habitable)] {
        requests.push(ChartRequest {
            name: format!("s_mass_vs_radius_{suffix}"),
            kind: ChartKind::Scatter,
            x: "S. Mass (SU)".to_owned(),
            y: Some("S. Radius (SU)".to_owned()),
            group: Some(config.class_column.clone()),
            subset,
        });
    }

    requests
}

fn subset_frame(df: &DataFrame, subset: Subset, config: &PipelineConfig) -> Result<DataFrame> {
    if subset == Subset::All {
        return Ok(df.clone());
    }
    let (habitable, non) = partition_by_habitability(df, &config.class_column, NON_HABITABLE_CLASS)?;
    Ok(match subset {
        Subset::NonHabitable => non,
        _ => habitable,
    })
}

fn request_columns(request: &ChartRequest) -> Vec<String> {
    let mut columns = vec![request.x.clone()];
    columns.extend(request.y.iter().cloned());
    columns.extend(
        request
            .group
            .iter()
            .filter(|g| **g != request.x)
            .cloned(),
    );
    columns
}

/// Stable sort of rows by the position of `column`'s value in `order`;
/// values outside `order` follow in their original order.
fn order_categories(df: &DataFrame, column: &str, order: &[String]) -> Result<DataFrame> {
    let values = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let ranks: Vec<usize> = values
        .str()?
        .into_iter()
        .map(|v| {
            v.and_then(|v| order.iter().position(|o| o == v))
                .unwrap_or(order.len())
        })
        .collect();

    let mut rows: Vec<IdxSize> = (0..df.height() as IdxSize).collect();
    rows.sort_by_key(|&i| ranks.get(i as usize).copied().unwrap_or(order.len()));
    Ok(df.take(&IdxCa::from_vec("rows".into(), rows))?)
}

fn bar_counts(df: &DataFrame, request: &ChartRequest) -> Result<DataFrame> {
    let x = df
        .column(&request.x)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let weights = match &request.y {
        Some(y) => Some(df.column(y)?.as_materialized_series().cast(&DataType::Float64)?),
        None => None,
    };

    let mut tally: BTreeMap<String, f64> = BTreeMap::new();
    for (i, key) in x.str()?.into_iter().enumerate() {
        let Some(key) = key else { continue };
        let weight = match &weights {
            Some(w) => w.f64()?.get(i).unwrap_or(0.0),
            None => 1.0,
        };
        *tally.entry(key.to_owned()).or_default() += weight;
    }

    let value_name = request.y.clone().unwrap_or_else(|| "count".to_owned());
    let keys: Vec<String> = tally.keys().cloned().collect();
    let values: Vec<f64> = tally.values().copied().collect();
    Ok(DataFrame::new(vec![
        Column::new(request.x.as_str().into(), keys),
        Column::new(value_name.as_str().into(), values),
    ])?)
}

/// Build the table a single chart draws.
pub fn chart_data(
    df: &DataFrame,
    request: &ChartRequest,
    config: &PipelineConfig,
) -> Result<DataFrame> {
    let columns = request_columns(request);
    let frame = subset_frame(df, request.subset, config)?;
    let frame = crate::habitability::schema::select_required(&frame, &request.name, &columns)?;

    match request.kind {
        ChartKind::Bar => bar_counts(&frame, request),
        ChartKind::Scatter => drop_missing(&frame),
        ChartKind::Swarm => {
            let frame = drop_missing(&frame)?;
            if request.x == config.class_column {
                order_categories(&frame, &request.x, &config.class_order)
            } else {
                Ok(frame)
            }
        }
    }
}

/// Write each chart's table to `dir/<name>.csv`, returning the written paths.
pub fn export_charts(
    df: &DataFrame,
    requests: &[ChartRequest],
    config: &PipelineConfig,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(requests.len());

    for request in requests {
        let mut data = chart_data(df, request, config)?;
        let path = dir.join(format!("{}.csv", request.name));
        save_df(&mut data, &path)?;
        tracing::debug!("Wrote {} rows of chart data to {}", data.height(), path.display());
        written.push(path);
    }

    tracing::info!("Exported {} chart tables to {}", written.len(), dir.display());
    Ok(written)
}

/// Write planets and habitable planets per star-class letter to `dir/s_type.csv`.
pub fn export_star_classes(
    df: &DataFrame,
    type_column: &str,
    habitable_column: &str,
    dir: &Path,
) -> Result<PathBuf> {
    let counts = star_class_counts(df, type_column, habitable_column)?;
    let mut data = DataFrame::new(vec![
        Column::new(
            "class".into(),
            counts.iter().map(|c| c.class.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "planets".into(),
            counts.iter().map(|c| c.planets as u64).collect::<Vec<_>>(),
        ),
        Column::new(
            "habitable".into(),
            counts.iter().map(|c| c.habitable as u64).collect::<Vec<_>>(),
        ),
    ])?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join("s_type.csv");
    save_df(&mut data, &path)?;
    tracing::debug!("Wrote {} star classes to {}", data.height(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PolarsResult<DataFrame> {
        df!(
            "P. Habitable Class" => &["thermoplanet", "non-habitable", "hypopsychroplanet", "mesoplanet", "non-habitable"],
            "S. Mass (SU)" => &[Some(1.0), Some(0.5), Some(0.9), None, Some(2.0)],
            "S. Radius (SU)" => &[1.1, 0.4, 0.8, 1.0, 1.9],
            "P. Habitable" => &[1i64, 0, 1, 1, 0]
        )
    }

    #[test]
    fn test_swarm_orders_by_class_order() -> anyhow::Result<()> {
        let df = sample()?;
        let config = PipelineConfig::default();
        let request = ChartRequest {
            name: "s_mass_h".to_owned(),
            kind: ChartKind::Swarm,
            x: config.class_column.clone(),
            y: Some("S. Mass (SU)".to_owned()),
            group: None,
            subset: Subset::Habitable,
        };

        let data = chart_data(&df, &request, &config)?;
        let classes: Vec<Option<&str>> = data
            .column("P. Habitable Class")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .collect();
        // mesoplanet row has no mass and is dropped
        assert_eq!(classes, vec![Some("hypopsychroplanet"), Some("thermoplanet")]);
        Ok(())
    }

    #[test]
    fn test_bar_sums_weights() -> anyhow::Result<()> {
        let df = sample()?;
        let config = PipelineConfig::default();
        let request = ChartRequest {
            name: "habitable_per_class".to_owned(),
            kind: ChartKind::Bar,
            x: "P. Habitable Class".to_owned(),
            y: Some("P. Habitable".to_owned()),
            group: None,
            subset: Subset::All,
        };
        let data = chart_data(&df, &request, &config)?;
        assert_eq!(data.height(), 4);
        let total: f64 = data
            .column("P. Habitable")?
            .as_materialized_series()
            .f64()?
            .into_no_null_iter()
            .sum();
        assert!((total - 3.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_default_requests_cover_both_subsets() {
        let requests = default_chart_requests(&PipelineConfig::default());
        assert_eq!(requests.len(), 18);
        assert!(requests.iter().any(|r| r.name == "s_teff_nh"));
        assert!(requests.iter().any(|r| r.kind == ChartKind::Scatter));
    }

    #[test]
    fn test_export_star_classes() -> anyhow::Result<()> {
        let df = df!(
            "S. Type" => &["G2 V", "M4", "G8", "K1"],
            "P. Habitable" => &[1i64, 0, 1, 0]
        )?;
        let dir = tempfile::tempdir()?;

        let path = export_star_classes(&df, "S. Type", "P. Habitable", dir.path())?;
        assert!(path.ends_with("s_type.csv"));

        let written = crate::habitability::io::load_df(&path)?;
        assert_eq!(written.height(), 3);
        let habitable: i64 = written
            .column("habitable")?
            .as_materialized_series()
            .cast(&DataType::Int64)?
            .i64()?
            .into_no_null_iter()
            .sum();
        assert_eq!(habitable, 2);
        Ok(())
    }

    #[test]
    fn test_export_writes_one_file_per_request() -> anyhow::Result<()> {
        let df = sample()?;
        let config = PipelineConfig::default();
        let requests: Vec<ChartRequest> = default_chart_requests(&config)
            .into_iter()
            .filter(|r| r.name.starts_with("s_mass"))
            .collect();
        let dir = tempfile::tempdir()?;

        let written = export_charts(&df, &requests, &config, dir.path())?;
        assert_eq!(written.len(), requests.len());
        assert!(written.iter().all(|p| p.exists()));
        Ok(())
    }
}
