use std::path::Path;

use anyhow::{Context, Result};
use rusty_predictor::{PredictionPipeline, PredictionPipelineConfig, UploadRequest};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("usage: rusty-predictor <input-file> [config.toml]")?;

    let config = match args.next() {
        Some(path) => PredictionPipelineConfig::load_from_path(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => PredictionPipelineConfig::default(),
    };

    // Hand the local file to the pipeline as if it had been uploaded.
    let request = UploadRequest::from_path(&config.upload_field, Path::new(&input))
        .with_context(|| format!("reading input file {input}"))?;

    let mut pipeline = PredictionPipeline::new(&request, config);
    match pipeline.run_pipeline() {
        Ok(config) => {
            println!("Wrote predictions to {}", config.prediction_file_path().display());
            Ok(())
        }
        Err(e) => {
            log::error!("Prediction pipeline failed: {e}");
            Err(e).context("prediction pipeline failed")
        }
    }
}
