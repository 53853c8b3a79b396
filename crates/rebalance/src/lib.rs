//! # rebalance
//!
//! Resampling study toolkit for imbalanced binary classification, built
//! around the abalone 9-vs-18 task.
//!
//! ## Modules
//!
//! - **core** - Row-major matrix, class-count helpers, `Classifier` trait, errors
//! - **io** - Typed data frame, CSV/KEEL loading, CSV export, JSON reports
//! - **preprocessing** - LabelEncoder, seeded train/test split, stratified k-fold
//! - **neighbors** - Brute-force nearest neighbour search
//! - **sampling** - Random under/over-sampling, Tomek links, SMOTE
//! - **linear** - L2-regularized logistic regression
//! - **tree** - Decision tree (CART, Gini) and random forest
//! - **metrics** - Accuracy, confusion matrix, per-class classification report
//! - **explore** - describe/info/value counts, correlation, terminal charts
//! - **datasets** - Seeded abalone-shaped generator
//! - **config** / **study** - The end-to-end study and its TOML settings

pub mod config;
pub mod study;

pub use config::{ForestConfig, LogisticConfig, StudyConfig};
pub use study::{save_report, Evaluation, ResampleSummary, Study, StudyReport};

/// Matrix, labels, estimator trait and errors.
pub use rebalance_core as core;

/// Data frame and file I/O.
pub use rebalance_io as io;

/// Encoding, splitting and cross-validation.
pub use rebalance_preprocessing as preprocessing;

/// Nearest neighbours.
pub use rebalance_neighbors as neighbors;

/// Resamplers.
pub use rebalance_sampling as sampling;

/// Linear models.
pub use rebalance_linear as linear;

/// Tree-based models.
pub use rebalance_tree as tree;

/// Evaluation metrics.
pub use rebalance_metrics as metrics;

/// Exploratory statistics and charts.
pub use rebalance_explore as explore;

/// Built-in datasets.
pub use rebalance_datasets as datasets;
