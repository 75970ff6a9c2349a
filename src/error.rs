use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a serialized preprocessor or model.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("artifact not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("artifact {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact {} is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Failures while transforming features or running the model.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("feature column '{0}' is missing from the input table")]
    MissingColumn(String),

    #[error("column '{column}', row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("model expects {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("model returned {got} predictions for {expected} rows")]
    PredictionCount { expected: usize, got: usize },

    #[error("unknown class code {0}, expected 0 or 1")]
    UnknownLabel(i64),
}

/// Failures while reading or writing tabular files.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: line {line} has {got} fields, header has {expected}", path.display())]
    TooManyFields {
        path: PathBuf,
        line: u64,
        expected: usize,
        got: usize,
    },

    #[error("expected a top-level JSON array of records")]
    NotAnArray,

    #[error("row {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("column '{column}' has {got} values, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
}

/// Top-level error returned by every [`crate::pipeline::PredictionPipeline`] operation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("request carries no file under field '{field}'")]
    MissingUpload { field: String },

    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl PipelineError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
