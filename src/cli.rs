use anyhow::{Context as _, Result};
use clap::Parser;
use exohab::config::{DEFAULT_STAR_TYPE_COLUMN, PipelineConfig};
use exohab::error::ResultExt as _;
use exohab::habitability::{
    AccuracyReport, CatalogKind, Pipeline, PipelineRun, PipelineStage, default_chart_requests,
    export_charts, export_star_classes, load_catalog, star_class_counts,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "exohab",
    version,
    about = "Predict planetary habitability from host-star properties"
)]
pub struct Cli {
    /// Catalog of confirmed exoplanets used for fitting (CSV, Parquet, JSON)
    #[arg(short, long, env = "EXOHAB_TRAINING")]
    pub training: PathBuf,

    /// Catalog of survey candidates used only for evaluation
    #[arg(short, long, env = "EXOHAB_GENERALIZATION")]
    pub generalization: PathBuf,

    /// Path to a JSON pipeline configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fix the random split so runs are reproducible
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of the training catalog held out for testing
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Print the accuracy report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write chart data tables for the training catalog into this directory
    #[arg(long)]
    pub charts: Option<PathBuf>,

    /// Log planets per star class for the training catalog
    #[arg(long)]
    pub profile: bool,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        Ok(config)
    }
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.pipeline_config()?;
    let pipeline = Pipeline::new(config).context("Invalid pipeline configuration")?;

    let training =
        load_catalog(&cli.training, CatalogKind::Training).in_stage(PipelineStage::Load)?;
    let generalization = load_catalog(&cli.generalization, CatalogKind::Generalization)
        .in_stage(PipelineStage::Load)?;

    if cli.profile {
        for count in star_class_counts(
            &training.frame,
            DEFAULT_STAR_TYPE_COLUMN,
            &pipeline.config().habitable_column,
        )? {
            tracing::info!(
                "Star class {}: {} planets, {} habitable",
                count.class,
                count.planets,
                count.habitable
            );
        }
    }

    if let Some(dir) = &cli.charts {
        let requests = default_chart_requests(pipeline.config());
        export_charts(&training.frame, &requests, pipeline.config(), dir)?;
        export_star_classes(
            &training.frame,
            DEFAULT_STAR_TYPE_COLUMN,
            &pipeline.config().habitable_column,
            dir,
        )?;
    }

    let run = pipeline.run(&training, &generalization)?;
    report(&run, cli.json)
}

fn report(run: &PipelineRun, json: bool) -> Result<()> {
    tracing::info!("Training catalog: {}", run.training_scrub.summary());
    tracing::info!("Generalization catalog: {}", run.generalization_scrub.summary());

    if json {
        println!("{}", serde_json::to_string_pretty(&run.accuracy)?);
    } else {
        print_accuracy(&run.accuracy);
    }
    Ok(())
}

fn print_accuracy(accuracy: &AccuracyReport) {
    for (label, value) in accuracy.lines() {
        println!("{label}: {value:.4}");
    }
}
