use crate::error::{HabitabilityError, Result};
use polars::prelude::*;
use std::path::Path;

use super::types::{Catalog, CatalogKind};

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Read a table from CSV, Parquet or JSON, chosen by file extension.
pub fn load_df(path: &Path) -> Result<DataFrame> {
    let ext = extension(path);

    let df = match ext.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_has_header(true)
            .finish()?
            .collect()?,
        "parquet" => ParquetReader::new(std::fs::File::open(path)?).finish()?,
        "json" => JsonReader::new(std::fs::File::open(path)?).finish()?,
        _ => {
            return Err(HabitabilityError::Config(format!(
                "Unsupported file extension '{ext}' for {}",
                path.display()
            )));
        }
    };

    tracing::info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

pub fn load_catalog(path: &Path, kind: CatalogKind) -> Result<Catalog> {
    let frame = load_df(path)?;
    Ok(Catalog::new(kind, frame))
}

/// Write a table as Parquet when the extension asks for it, CSV otherwise.
pub fn save_df(df: &mut DataFrame, path: &Path) -> Result<()> {
    if extension(path) == "parquet" {
        let file = std::fs::File::create(path)?;
        ParquetWriter::new(file).finish(df)?;
    } else {
        let file = std::fs::File::create(path)?;
        CsvWriter::new(file).include_header(true).finish(df)?;
    }
    Ok(())
}
