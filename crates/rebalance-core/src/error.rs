use thiserror::Error;

/// Error type shared by every rebalance crate.
#[derive(Debug, Error)]
pub enum RebalanceError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown label {label:?} (known: {known:?})")]
    UnknownLabel { label: String, known: Vec<String> },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("{0} is not fitted")]
    NotFitted(&'static str),

    #[error("Sampling failed: {0}")]
    Sampling(String),

    #[error("Singular matrix: cannot solve system")]
    SingularMatrix,

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RebalanceResult<T> = Result<T, RebalanceError>;
