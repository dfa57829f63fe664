use super::{seeded_config, synthetic_catalog};
use crate::config::PipelineConfig;
use crate::error::HabitabilityError;
use crate::habitability::*;
use anyhow::Result;
use polars::prelude::*;
use rand::SeedableRng as _;
use rand::rngs::StdRng;

fn filtered(df: DataFrame, kind: CatalogKind, config: &PipelineConfig) -> Result<FilteredCatalog> {
    Ok(filter_catalog(&Catalog::new(kind, df), config)?)
}

#[test]
fn test_ten_rows_two_missing_masses() -> Result<()> {
    let mut df = synthetic_catalog(10, false)?;
    let masses: Vec<Option<f64>> = (0..10)
        .map(|i| if i == 3 || i == 7 { None } else { Some(1.0 + i as f64) })
        .collect();
    df.with_column(Column::new("S. Mass (SU)".into(), masses))?;

    let config = PipelineConfig::default();
    let out = filtered(df, CatalogKind::Training, &config)?;
    assert_eq!(out.frame.height(), 8);
    assert_eq!(out.report.missing_drops, 2);
    assert_eq!(out.frame.column("S. Mass (SU)")?.null_count(), 0);
    Ok(())
}

#[test]
fn test_filtered_table_has_no_missing_or_sentinel() -> Result<()> {
    let mut df = synthetic_catalog(30, true)?;
    let sizes: Vec<Option<String>> = (0..30)
        .map(|i| match i % 6 {
            0 => Some("-".to_owned()),
            1 => None,
            _ => Some(format!("{}", i as f64 / 100.0)),
        })
        .collect();
    df.with_column(Column::new("S. Size from Planet (deg)".into(), sizes))?;

    let config = PipelineConfig::default();
    let out = filtered(df, CatalogKind::Generalization, &config)?;

    assert_eq!(out.frame.height(), 20);
    assert_eq!(out.report.sentinel_drops, vec![("S. Size from Planet (deg)".to_owned(), 5)]);
    assert_eq!(out.report.missing_drops, 5);
    for column in out.frame.get_columns() {
        assert_eq!(column.null_count(), 0, "{} holds nulls", column.name());
    }
    for name in &config.feature_columns {
        assert_eq!(out.frame.column(name)?.dtype(), &DataType::Float64, "{name}");
    }
    Ok(())
}

#[test]
fn test_filter_is_idempotent() -> Result<()> {
    let mut df = synthetic_catalog(20, false)?;
    let ages: Vec<Option<f64>> = (0..20).map(|i| (i % 4 != 0).then_some(4.5)).collect();
    df.with_column(Column::new("S. Age (Gyrs)".into(), ages))?;

    let config = PipelineConfig::default();
    let once = filtered(df, CatalogKind::Training, &config)?;
    let twice = filtered(once.frame.clone(), CatalogKind::Training, &config)?;

    assert_eq!(twice.report.rows_dropped(), 0);
    assert!(twice.frame.equals(&once.frame));
    Ok(())
}

#[test]
fn test_training_catalog_ignores_generalization_sentinels() -> Result<()> {
    // The training catalog registers no sentinels, so a dash there is a data
    // quality failure rather than a silently dropped row.
    let mut df = synthetic_catalog(10, true)?;
    let sizes: Vec<&str> = (0..10).map(|i| if i == 0 { "-" } else { "0.5" }).collect();
    df.with_column(Column::new("S. Size from Planet (deg)".into(), sizes))?;

    let config = PipelineConfig::default();
    let err = filter_catalog(&Catalog::new(CatalogKind::Training, df.clone()), &config)
        .unwrap_err();
    assert!(matches!(err, HabitabilityError::DataQuality { .. }));

    let out = filtered(df, CatalogKind::Generalization, &config)?;
    assert_eq!(out.frame.height(), 9);
    Ok(())
}

#[test]
fn test_tree_beats_majority_on_its_own_training_data() -> Result<()> {
    let config = seeded_config(1);
    let out = filtered(synthetic_catalog(60, false)?, CatalogKind::Training, &config)?;
    let x = feature_matrix(&out.frame, &config.feature_columns)?;
    let y = LabelEncoder::new(&config.class_order).encode(out.frame.column(&config.class_column)?)?;

    let model = TreeClassifier::default().fit(&x, &y)?;
    let acc = accuracy_score(&y, &model.predict(&x)?)?;
    let baseline = majority_baseline_accuracy(&y)?;

    assert!((0.0..=1.0).contains(&acc));
    assert!(acc >= baseline, "tree {acc} below baseline {baseline}");
    Ok(())
}

#[test]
fn test_split_of_filtered_catalog_preserves_rows() -> Result<()> {
    let config = seeded_config(2);
    let out = filtered(synthetic_catalog(100, false)?, CatalogKind::Training, &config)?;
    let x = feature_matrix(&out.frame, &config.feature_columns)?;
    let y = LabelEncoder::new(&config.habitable_values)
        .encode(out.frame.column(&config.habitable_column)?)?;

    let mut rng = StdRng::seed_from_u64(2);
    let split = train_test_split(&x, &y, 0.2, &mut rng)?;
    assert_eq!(split.test_count(), 20);
    assert_eq!(split.train_count() + split.test_count(), 100);

    for (i, &row) in split.test_rows.iter().enumerate() {
        assert_eq!(split.test_labels[i], y[row]);
        assert_eq!(split.test_features.row(i), x.row(row));
    }
    Ok(())
}
