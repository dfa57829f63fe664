//! End-to-end runs against the fixture catalogs in `testdata/`.

use exohab::config::{DEFAULT_STAR_TYPE_COLUMN, PipelineConfig};
use exohab::error::HabitabilityError;
use exohab::habitability::{
    CatalogKind, Pipeline, PipelineStage, default_chart_requests, export_charts,
    export_star_classes, load_catalog, star_class_counts,
};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn seeded_pipeline(seed: u64) -> anyhow::Result<Pipeline> {
    let config = PipelineConfig {
        seed: Some(seed),
        ..PipelineConfig::default()
    };
    Ok(Pipeline::new(config)?)
}

#[test]
fn test_end_to_end_reports_four_accuracies() -> anyhow::Result<()> {
    let pipeline = seeded_pipeline(42)?;
    let run = pipeline.run_files(&fixture("confirmed.csv"), &fixture("kepler.csv"))?;

    for (label, value) in run.accuracy.lines() {
        assert!((0.0..=1.0).contains(&value), "{label} out of range: {value}");
    }

    // Effective temperature separates every class in the fixtures
    assert!(run.accuracy.habitability_holdout > 0.8);
    assert!(run.accuracy.habitability_generalization > 0.8);
    assert!(run.accuracy.class_generalization > 0.8);
    Ok(())
}

#[test]
fn test_end_to_end_scrub_reports() -> anyhow::Result<()> {
    let pipeline = seeded_pipeline(1)?;
    let run = pipeline.run_files(&fixture("confirmed.csv"), &fixture("kepler.csv"))?;

    // Three confirmed rows have a blank feature
    assert_eq!(run.training_scrub.rows_in, 64);
    assert_eq!(run.training_scrub.missing_drops, 3);
    assert_eq!(run.training_scrub.rows_out, 61);

    // Five candidates have "-" for angular size
    assert_eq!(run.generalization_scrub.rows_in, 30);
    let sentinel_drops: usize = run
        .generalization_scrub
        .sentinel_drops
        .iter()
        .map(|(_, n)| n)
        .sum();
    assert_eq!(sentinel_drops, 5);
    assert_eq!(run.generalization_scrub.rows_out, 25);

    for task in &run.tasks {
        assert_eq!(task.test_rows, 13);
        assert_eq!(task.train_rows + task.test_rows, 61);
    }
    Ok(())
}

#[test]
fn test_end_to_end_missing_column_names_stage_and_column() -> anyhow::Result<()> {
    let pipeline = seeded_pipeline(3)?;
    let err = pipeline
        .run_files(&fixture("confirmed.csv"), &fixture("kepler_no_luminosity.csv"))
        .unwrap_err();

    assert!(matches!(
        err,
        HabitabilityError::Stage {
            stage: PipelineStage::Filter,
            ..
        }
    ));
    assert!(matches!(
        err.root(),
        HabitabilityError::Schema { table, column }
            if table == "generalization" && column == "S. Luminosity (SU)"
    ));
    Ok(())
}

#[test]
fn test_end_to_end_missing_file_fails_in_load_stage() -> anyhow::Result<()> {
    let pipeline = seeded_pipeline(3)?;
    let err = pipeline
        .run_files(&fixture("confirmed.csv"), &fixture("does_not_exist.csv"))
        .unwrap_err();
    assert!(err.to_string().starts_with("Stage 'load' failed"));
    Ok(())
}

#[test]
fn test_star_class_profile_of_fixture() -> anyhow::Result<()> {
    let catalog = load_catalog(&fixture("confirmed.csv"), CatalogKind::Training)?;
    let counts = star_class_counts(&catalog.frame, DEFAULT_STAR_TYPE_COLUMN, "P. Habitable")?;

    let classes: Vec<&str> = counts.iter().map(|c| c.class.as_str()).collect();
    assert_eq!(classes, vec!["A", "F", "G", "K", "M"]);
    assert_eq!(counts.iter().map(|c| c.planets).sum::<usize>(), 64);

    // Every M-dwarf planet in the fixture is non-habitable
    let m = counts.iter().find(|c| c.class == "M");
    assert_eq!(m.map(|c| c.habitable), Some(0));
    Ok(())
}

#[test]
fn test_chart_export_from_fixture() -> anyhow::Result<()> {
    let config = PipelineConfig::default();
    let catalog = load_catalog(&fixture("confirmed.csv"), CatalogKind::Training)?;
    let dir = tempfile::tempdir()?;

    let requests = default_chart_requests(&config);
    let written = export_charts(&catalog.frame, &requests, &config, dir.path())?;

    assert_eq!(written.len(), requests.len());
    assert!(dir.path().join("s_teff_h.csv").exists());
    assert!(dir.path().join("s_mass_vs_radius_all.csv").exists());

    let s_type = export_star_classes(
        &catalog.frame,
        DEFAULT_STAR_TYPE_COLUMN,
        &config.habitable_column,
        dir.path(),
    )?;
    let table = load_catalog(&s_type, CatalogKind::Training)?.frame;
    assert_eq!(table.height(), 5);
    Ok(())
}
