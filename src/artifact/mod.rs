/// Trained artifacts: the capabilities the pipeline needs and how they are
/// read from disk.
///
/// ```text
///   preprocessor.pkl        model.pkl
///        │                      │
///        ▼                      ▼
///   ┌─────────────┐       ┌──────────┐
///   │ Preprocessor │─────▶│  Model   │
///   └─────────────┘       └──────────┘
///   Table → FeatureMatrix  FeatureMatrix → class codes
/// ```
pub mod classifier;
pub mod preprocessor;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::data::model::Table;
use crate::error::{InferenceError, LoadError};

pub use classifier::ClassifierArtifact;
pub use preprocessor::PreprocessorArtifact;

/// Dense numeric features, one row per input row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }
}

/// Converts raw input rows into the representation the model expects.
pub trait Preprocessor {
    fn transform(&self, table: &Table) -> Result<FeatureMatrix, InferenceError>;
}

/// Assigns a class code to every feature row.
pub trait Model {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<i64>, InferenceError>;
}

/// Where the pipeline gets its preprocessor and model from.
pub trait ArtifactSource {
    fn load_preprocessor(&self, path: &Path) -> Result<Box<dyn Preprocessor>, LoadError>;
    fn load_model(&self, path: &Path) -> Result<Box<dyn Model>, LoadError>;
}

/// Reads JSON artifacts tagged by `kind`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArtifacts;

impl ArtifactSource for JsonArtifacts {
    fn load_preprocessor(&self, path: &Path) -> Result<Box<dyn Preprocessor>, LoadError> {
        let artifact: PreprocessorArtifact = load_object(path)?;
        artifact.validate().map_err(|reason| LoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        log::debug!("Loaded preprocessor from {}", path.display());
        Ok(Box::new(artifact))
    }

    fn load_model(&self, path: &Path) -> Result<Box<dyn Model>, LoadError> {
        let artifact: ClassifierArtifact = load_object(path)?;
        artifact.validate().map_err(|reason| LoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        log::debug!("Loaded model from {}", path.display());
        Ok(Box::new(artifact))
    }
}

/// Read and deserialize a JSON artifact.
pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}
