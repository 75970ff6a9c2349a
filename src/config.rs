//! Configuration for the prediction pipeline.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

/// Paths and names used by one [`crate::pipeline::PredictionPipeline`].
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PredictionPipelineConfig {
    /// Directory holding the trained artifacts
    pub artifact_dir: PathBuf,
    pub model_file_name: String,
    pub preprocessor_file_name: String,
    /// Directory the predicted CSV is written to
    pub prediction_output_dirname: PathBuf,
    pub prediction_file_name: String,
    /// Directory uploads are copied into before they are read
    pub input_dirname: PathBuf,
    /// Give every invocation its own random directory under `input_dirname`
    pub scoped_working_dir: bool,
    /// Request field carrying the upload
    pub upload_field: String,
    /// Name of the appended prediction column
    pub target_column: String,
    /// Index column written by `df.to_csv()`; dropped on read
    pub index_column: String,
}

impl Default for PredictionPipelineConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("artifacts"),
            model_file_name: "model.pkl".to_string(),
            preprocessor_file_name: "preprocessor.pkl".to_string(),
            prediction_output_dirname: PathBuf::from("predictions"),
            prediction_file_name: "predicted_file.csv".to_string(),
            input_dirname: PathBuf::from("prediction_artifacts"),
            scoped_working_dir: true,
            upload_field: "file".to_string(),
            target_column: "TARGET_COLUMN".to_string(),
            index_column: "Unnamed: 0".to_string(),
        }
    }
}

impl PredictionPipelineConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Rebase every relative directory onto `base`. Absolute paths are kept.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.artifact_dir = base.join(&self.artifact_dir);
        self.prediction_output_dirname = base.join(&self.prediction_output_dirname);
        self.input_dirname = base.join(&self.input_dirname);
        self
    }

    pub fn model_file_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.model_file_name)
    }

    pub fn preprocessor_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.preprocessor_file_name)
    }

    pub fn prediction_file_path(&self) -> PathBuf {
        self.prediction_output_dirname.join(&self.prediction_file_name)
    }
}
