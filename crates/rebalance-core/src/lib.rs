pub mod matrix;
pub mod labels;
pub mod estimator;
pub mod error;

pub use matrix::{squared_distance, Matrix};
pub use labels::{class_counts, majority_class, minority_class, n_classes};
pub use estimator::{check_xy, Classifier};
pub use error::{RebalanceError, RebalanceResult};
