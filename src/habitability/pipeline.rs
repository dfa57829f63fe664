//! Pipeline orchestrator.
//!
//! One straight-through run per invocation:
//!
//! ```text
//! Load ──> Filter ──> Split ──> Fit ──> Evaluate
//!  │         │          │        │         │
//!  │         │          │        │         └─ hold-out + generalization accuracy, per task
//!  │         │          │        └─ one tree per task, never refitted
//!  │         │          └─ an independent random split per task
//!  │         └─ identical schema filter + scrub on both catalogs
//!  └─ training and generalization catalogs
//! ```
//!
//! Any failure aborts the run; there is no partial report.

use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt as _};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng as _};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use super::classifier::{
    Classifier, MajorityClassifier, Predictor as _, TreeClassifier, majority_class,
};
use super::evaluate::accuracy_score;
use super::io::load_catalog;
use super::schema::{feature_matrix, select_required};
use super::scrub::scrub;
use super::split::train_test_split;
use super::types::{AccuracyReport, Catalog, CatalogKind, LabelEncoder, ScrubReport, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Load,
    Filter,
    Split,
    Fit,
    Evaluate,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Filter => "filter",
            Self::Split => "split",
            Self::Fit => "fit",
            Self::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog after schema filtering and scrubbing.
#[derive(Debug, Clone)]
pub struct FilteredCatalog {
    pub kind: CatalogKind,
    pub frame: DataFrame,
    pub report: ScrubReport,
}

/// Apply the schema filter and scrubber with the catalog's own sentinel set.
pub fn filter_catalog(catalog: &Catalog, config: &PipelineConfig) -> Result<FilteredCatalog> {
    let table = catalog.kind.as_str();
    let sentinels = match catalog.kind {
        CatalogKind::Training => &config.training_sentinels,
        CatalogKind::Generalization => &config.generalization_sentinels,
    };

    let selected = select_required(&catalog.frame, table, &config.required_columns())?;
    let (frame, report) = scrub(&selected, table, sentinels, &config.feature_columns)?;

    Ok(FilteredCatalog {
        kind: catalog.kind,
        frame,
        report,
    })
}

/// Per-task results of a run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub task: Task,
    pub label_column: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub holdout_accuracy: f64,
    pub generalization_accuracy: f64,
    /// Hold-out accuracy of always predicting the majority training class
    pub baseline_accuracy: f64,
    pub fit_duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub accuracy: AccuracyReport,
    pub training_scrub: ScrubReport,
    pub generalization_scrub: ScrubReport,
    pub tasks: Vec<TaskOutcome>,
    pub duration: Duration,
}

pub struct Pipeline<C: Classifier = TreeClassifier> {
    config: PipelineConfig,
    classifier: C,
}

impl Pipeline<TreeClassifier> {
    /// Pipeline using the decision tree configured in `config`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let classifier = TreeClassifier::new(config.max_depth, config.min_samples_split);
        Self::with_classifier(config, classifier)
    }
}

impl<C: Classifier> Pipeline<C> {
    pub fn with_classifier(config: PipelineConfig, classifier: C) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load both catalogs from disk, then [`Pipeline::run`].
    pub fn run_files(&self, training: &Path, generalization: &Path) -> Result<PipelineRun> {
        let training =
            load_catalog(training, CatalogKind::Training).in_stage(PipelineStage::Load)?;
        let generalization = load_catalog(generalization, CatalogKind::Generalization)
            .in_stage(PipelineStage::Load)?;
        self.run(&training, &generalization)
    }

    pub fn run(&self, training: &Catalog, generalization: &Catalog) -> Result<PipelineRun> {
        let start = Instant::now();
        tracing::info!(
            "Starting habitability pipeline: {} training rows, {} generalization rows",
            training.height(),
            generalization.height()
        );

        let training = filter_catalog(training, &self.config).in_stage(PipelineStage::Filter)?;
        let generalization =
            filter_catalog(generalization, &self.config).in_stage(PipelineStage::Filter)?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let habitability = self.run_task(
            Task::Habitability,
            &training.frame,
            &generalization.frame,
            &mut rng,
        )?;
        let class = self.run_task(
            Task::HabitableClass,
            &training.frame,
            &generalization.frame,
            &mut rng,
        )?;

        let accuracy = AccuracyReport {
            habitability_holdout: habitability.holdout_accuracy,
            habitability_generalization: habitability.generalization_accuracy,
            class_holdout: class.holdout_accuracy,
            class_generalization: class.generalization_accuracy,
        };

        let duration = start.elapsed();
        tracing::info!("Pipeline finished in {:.2}s", duration.as_secs_f64());

        Ok(PipelineRun {
            accuracy,
            training_scrub: training.report,
            generalization_scrub: generalization.report,
            tasks: vec![habitability, class],
            duration,
        })
    }

    fn task_columns(&self, task: Task) -> (&str, &[String]) {
        match task {
            Task::Habitability => (
                self.config.habitable_column.as_str(),
                self.config.habitable_values.as_slice(),
            ),
            Task::HabitableClass => (
                self.config.class_column.as_str(),
                self.config.class_order.as_slice(),
            ),
        }
    }

    fn encoder(&self, task: Task) -> LabelEncoder {
        let (_, vocabulary) = self.task_columns(task);
        LabelEncoder::new(vocabulary)
    }

    fn encode(&self, frame: &DataFrame, task: Task) -> Result<(Array2<f64>, Array1<usize>)> {
        let (label_column, _) = self.task_columns(task);
        let features = feature_matrix(frame, &self.config.feature_columns)?;
        let labels = self.encoder(task).encode(frame.column(label_column)?)?;
        Ok((features, labels))
    }

    /// Generalization labels the model was never taught count as misses.
    fn encode_generalization(
        &self,
        frame: &DataFrame,
        task: Task,
    ) -> Result<(Array2<f64>, Array1<usize>)> {
        let (label_column, _) = self.task_columns(task);
        let features = feature_matrix(frame, &self.config.feature_columns)?;
        let (labels, unseen) = self
            .encoder(task)
            .encode_lenient(frame.column(label_column)?)?;
        if unseen > 0 {
            tracing::warn!(
                "{unseen} of {} generalization rows have a '{label_column}' value outside the known classes; scored as misses",
                labels.len()
            );
        }
        Ok((features, labels))
    }

    fn run_task<R: Rng + ?Sized>(
        &self,
        task: Task,
        training: &DataFrame,
        generalization: &DataFrame,
        rng: &mut R,
    ) -> Result<TaskOutcome> {
        let (label_column, _) = self.task_columns(task);

        let (features, labels) = self.encode(training, task).in_stage(PipelineStage::Split)?;
        let split = train_test_split(&features, &labels, self.config.test_fraction, rng)
            .in_stage(PipelineStage::Split)?;

        let distinct: HashSet<usize> = split.train_labels.iter().copied().collect();
        if distinct.len() < 2 {
            tracing::warn!(
                "{}: training split holds a single '{label_column}' class; the tree can only predict it",
                task.as_str()
            );
        }
        if let Some(majority) = majority_class(&split.train_labels) {
            tracing::debug!(
                "{}: majority training class '{}'",
                task.as_str(),
                self.encoder(task).decode(majority).unwrap_or("?")
            );
        }

        let fit_start = Instant::now();
        let model = self
            .classifier
            .fit(&split.train_features, &split.train_labels)
            .in_stage(PipelineStage::Fit)?;
        let fit_duration = fit_start.elapsed();
        tracing::info!(
            "Fitted {} for {} on {} rows in {:?}",
            self.classifier.name(),
            task.as_str(),
            split.train_count(),
            fit_duration
        );

        let holdout_accuracy = model
            .predict(&split.test_features)
            .and_then(|predicted| accuracy_score(&split.test_labels, &predicted))
            .in_stage(PipelineStage::Evaluate)?;

        let baseline_accuracy = MajorityClassifier
            .fit(&split.train_features, &split.train_labels)
            .and_then(|m| m.predict(&split.test_features))
            .and_then(|predicted| accuracy_score(&split.test_labels, &predicted))
            .in_stage(PipelineStage::Evaluate)?;

        let (gen_features, gen_labels) = self
            .encode_generalization(generalization, task)
            .in_stage(PipelineStage::Evaluate)?;
        let generalization_accuracy = model
            .predict(&gen_features)
            .and_then(|predicted| accuracy_score(&gen_labels, &predicted))
            .in_stage(PipelineStage::Evaluate)?;

        tracing::info!(
            "{}: hold-out accuracy {:.4} (majority baseline {:.4}), generalization accuracy {:.4} over {} rows",
            task.as_str(),
            holdout_accuracy,
            baseline_accuracy,
            generalization_accuracy,
            gen_labels.len()
        );

        Ok(TaskOutcome {
            task,
            label_column: label_column.to_owned(),
            train_rows: split.train_count(),
            test_rows: split.test_count(),
            holdout_accuracy,
            generalization_accuracy,
            baseline_accuracy,
            fit_duration,
        })
    }
}
