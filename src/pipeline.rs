//! The prediction pipeline: persist upload → load input → predict → write CSV.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::artifact::{ArtifactSource, JsonArtifacts};
use crate::config::PredictionPipelineConfig;
use crate::data::loader::load_input;
use crate::data::model::{CellValue, Table};
use crate::data::writer::write_csv;
use crate::error::{InferenceError, PipelineError, Result};
use crate::label::TargetLabel;
use crate::upload::{UploadRequest, WorkingDir};

/// Runs one uploaded table through the trained preprocessor and model.
///
/// The pipeline borrows the request for its lifetime and owns the working
/// directory the upload is copied into.
pub struct PredictionPipeline<'r, A = JsonArtifacts> {
    request: &'r UploadRequest,
    config: PredictionPipelineConfig,
    artifacts: A,
    working_dir: Option<WorkingDir>,
}

impl<'r> PredictionPipeline<'r> {
    /// Pipeline reading JSON artifacts from the configured paths.
    pub fn new(request: &'r UploadRequest, config: PredictionPipelineConfig) -> Self {
        Self::with_artifacts(request, config, JsonArtifacts)
    }
}

impl<'r, A: ArtifactSource> PredictionPipeline<'r, A> {
    pub fn with_artifacts(
        request: &'r UploadRequest,
        config: PredictionPipelineConfig,
        artifacts: A,
    ) -> Self {
        PredictionPipeline {
            request,
            config,
            artifacts,
            working_dir: None,
        }
    }

    /// Copy the uploaded file into the working directory under its original
    /// name and return the written path.
    pub fn save_input_files(&mut self) -> Result<PathBuf> {
        let request = self.request;
        let field = &self.config.upload_field;
        let file = request
            .file(field)
            .ok_or_else(|| PipelineError::MissingUpload { field: field.clone() })?;
        let name = file.safe_name().ok_or_else(|| {
            PipelineError::io(
                format!("upload under '{field}' has no usable filename"),
                io::Error::new(io::ErrorKind::InvalidInput, file.filename.clone()),
            )
        })?;

        let dir = match self.working_dir.take() {
            Some(dir) => dir,
            None => self.create_working_dir()?,
        };
        let path = dir.path().join(name);
        let saved = file.save(&path);
        self.working_dir = Some(dir);
        saved.map_err(|e| PipelineError::io(format!("saving upload to {}", path.display()), e))?;

        log::debug!(
            "Saved upload '{}' ({} bytes) to {}",
            file.filename,
            file.bytes.len(),
            path.display()
        );
        Ok(path)
    }

    fn create_working_dir(&self) -> Result<WorkingDir> {
        let parent = &self.config.input_dirname;
        let dir = if self.config.scoped_working_dir {
            WorkingDir::scoped_in(parent)
        } else {
            WorkingDir::fixed(parent)
        };
        dir.map_err(|e| {
            PipelineError::io(format!("creating working directory in {}", parent.display()), e)
        })
    }

    /// Delete the working directory, if one was created.
    pub fn remove_working_dir(&mut self) {
        if let Some(dir) = self.working_dir.take() {
            dir.remove();
        }
    }

    /// Load both artifacts, transform `features` and return one class code per row.
    pub fn predict(&self, features: &Table) -> Result<Vec<i64>> {
        let model = self.artifacts.load_model(&self.config.model_file_path())?;
        let preprocessor = self
            .artifacts
            .load_preprocessor(&self.config.preprocessor_path())?;

        let transformed = preprocessor.transform(features)?;
        let predictions = model.predict(&transformed)?;
        Ok(predictions)
    }

    /// Read the table at `path`, predict, and write the labelled table to the
    /// configured output file. Returns the labelled table.
    pub fn get_predicted_table(&self, path: &Path) -> Result<Table> {
        if !path.exists() {
            return Err(PipelineError::NotFound(path.to_path_buf()));
        }
        let table = load_input(path, &self.config.index_column)?;
        self.annotate_and_write(table)
    }

    fn annotate_and_write(&self, mut table: Table) -> Result<Table> {
        let predictions = self.predict(&table)?;
        if predictions.len() != table.len() {
            return Err(InferenceError::PredictionCount {
                expected: table.len(),
                got: predictions.len(),
            }
            .into());
        }

        let labels = predictions
            .into_iter()
            .map(|code| {
                TargetLabel::from_code(code).map(|l| CellValue::String(l.as_str().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        table.push_column(&self.config.target_column, labels)?;

        let out_dir = &self.config.prediction_output_dirname;
        fs::create_dir_all(out_dir).map_err(|e| {
            PipelineError::io(format!("creating output directory {}", out_dir.display()), e)
        })?;

        let out_path = self.config.prediction_file_path();
        write_csv(&table, &out_path)?;
        log::info!(
            "Predictions completed: {} rows written to {}",
            table.len(),
            out_path.display()
        );

        Ok(table)
    }

    /// Save the upload, read it into memory, remove the working directory and
    /// write predictions. The working directory is removed on every path.
    pub fn run_pipeline(&mut self) -> Result<&PredictionPipelineConfig> {
        let input_path = match self.save_input_files() {
            Ok(path) => path,
            Err(e) => {
                self.remove_working_dir();
                return Err(e);
            }
        };

        let loaded = load_input(&input_path, &self.config.index_column);
        self.remove_working_dir();
        let table = loaded?;
        log::info!("Loaded {} rows from upload", table.len());

        self.annotate_and_write(table)?;
        Ok(&self.config)
    }
}
