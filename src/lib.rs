pub mod artifact;
pub mod config;
pub mod data;
pub mod error;
pub mod label;
pub mod pipeline;
pub mod upload;

// Re-export common types
pub use config::PredictionPipelineConfig;
pub use error::{InferenceError, LoadError, PipelineError, TableError};
pub use pipeline::PredictionPipeline;
pub use upload::{UploadRequest, UploadedFile};
