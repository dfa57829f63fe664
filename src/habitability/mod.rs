pub mod charts;
pub mod classifier;
pub mod evaluate;
pub mod io;
pub mod pipeline;
pub mod profile;
pub mod schema;
pub mod scrub;
pub mod split;
pub mod types;

pub use charts::{
    ChartKind, ChartRequest, Subset, chart_data, default_chart_requests, export_charts,
    export_star_classes,
};
pub use classifier::{Classifier, MajorityClassifier, Predictor, TrainedTree, TreeClassifier};
pub use evaluate::{accuracy, accuracy_score, majority_baseline_accuracy};
pub use io::{load_catalog, load_df, save_df};
pub use pipeline::{FilteredCatalog, Pipeline, PipelineRun, PipelineStage, TaskOutcome, filter_catalog};
pub use profile::{StarClassCount, partition_by_habitability, star_class_counts};
pub use schema::{coerce_numeric, feature_matrix, select_required};
pub use scrub::{drop_missing, drop_sentinel, scrub};
pub use split::{split_indices, test_size, train_test_split};
pub use types::{
    AccuracyReport, Catalog, CatalogKind, LabelEncoder, ScrubReport, Sentinel, Task,
    TrainTestSplit,
};
