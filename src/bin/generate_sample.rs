use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_predictor::artifact::classifier::{ClassifierArtifact, LogisticRegression};
use rusty_predictor::artifact::preprocessor::{ImputeScale, PreprocessorArtifact};
use rusty_predictor::PredictionPipelineConfig;

const N_WAFERS: usize = 100;
const N_SENSORS: usize = 5;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Per-sensor (mean, std dev) of the simulated readings.
const SENSOR_PROFILES: [(f64, f64); N_SENSORS] = [
    (3000.0, 80.0),
    (2500.0, 60.0),
    (2200.0, 30.0),
    (1400.0, 400.0),
    (1.5, 0.5),
];

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut rng = SimpleRng::new(42);

    let wafers: Vec<String> = (0..N_WAFERS).map(|i| format!("Wafer-{}", 801 + i)).collect();
    let sensor_names: Vec<String> = (1..=N_SENSORS).map(|i| format!("Sensor-{i}")).collect();

    // readings[s][w]; roughly 3% of readings are missing
    let readings: Vec<Vec<Option<f64>>> = SENSOR_PROFILES
        .iter()
        .map(|&(mean, std_dev)| {
            (0..N_WAFERS)
                .map(|_| {
                    let value = rng.gauss(mean, std_dev);
                    (rng.next_f64() >= 0.03).then_some((value * 1000.0).round() / 1000.0)
                })
                .collect()
        })
        .collect();

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    write_csv(&out_dir.join("sample_input.csv"), &wafers, &sensor_names, &readings)?;
    write_parquet(&out_dir.join("sample_input.parquet"), &wafers, &sensor_names, &readings)?;
    write_artifacts(&out_dir, &sensor_names, &readings)?;

    println!(
        "Wrote {N_WAFERS} wafers ({N_SENSORS} sensors each) and demo artifacts to {}",
        out_dir.display()
    );
    Ok(())
}

/// CSV as written by `df.to_csv()` with its index, so the loader has an
/// `Unnamed: 0` column to drop.
fn write_csv(
    path: &Path,
    wafers: &[String],
    sensors: &[String],
    readings: &[Vec<Option<f64>>],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating sample CSV")?;

    let mut header = vec![String::new(), "Wafer".to_string()];
    header.extend(sensors.iter().cloned());
    writer.write_record(&header)?;

    for (w, wafer) in wafers.iter().enumerate() {
        let mut record = vec![w.to_string(), wafer.clone()];
        record.extend(
            readings
                .iter()
                .map(|col| col[w].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush().context("flushing sample CSV")?;
    Ok(())
}

fn write_parquet(
    path: &Path,
    wafers: &[String],
    sensors: &[String],
    readings: &[Vec<Option<f64>>],
) -> Result<()> {
    let mut fields = vec![Field::new("Wafer", DataType::Utf8, false)];
    fields.extend(sensors.iter().map(|name| Field::new(name, DataType::Float64, true)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(wafers.to_vec()))];
    columns.extend(
        readings
            .iter()
            .map(|col| Arc::new(Float64Array::from(col.clone())) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating sample parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Fit a median-impute + standard-scale preprocessor on the sample and pair
/// it with a fixed logistic model, written where the default config expects them.
fn write_artifacts(
    out_dir: &Path,
    sensors: &[String],
    readings: &[Vec<Option<f64>>],
) -> Result<()> {
    let mut fill = Vec::with_capacity(sensors.len());
    let mut center = Vec::with_capacity(sensors.len());
    let mut scale = Vec::with_capacity(sensors.len());

    for col in readings {
        let mut present: Vec<f64> = col.iter().flatten().copied().collect();
        present.sort_by(f64::total_cmp);
        let n = present.len().max(1) as f64;
        let mean = present.iter().sum::<f64>() / n;
        let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        fill.push(present.get(present.len() / 2).copied().unwrap_or(0.0));
        center.push(mean);
        scale.push(var.sqrt());
    }

    let preprocessor = PreprocessorArtifact::ImputeScale(ImputeScale {
        columns: sensors.to_vec(),
        fill,
        center,
        scale,
    });
    let model = ClassifierArtifact::LogisticRegression(LogisticRegression {
        weights: vec![0.8, -0.4, 0.3, -1.1, 0.6],
        intercept: 0.2,
        threshold: 0.5,
    });

    let config = PredictionPipelineConfig::default().rooted_at(out_dir);
    std::fs::create_dir_all(&config.artifact_dir).context("creating artifact directory")?;
    std::fs::write(config.preprocessor_path(), serde_json::to_vec_pretty(&preprocessor)?)
        .context("writing preprocessor artifact")?;
    std::fs::write(config.model_file_path(), serde_json::to_vec_pretty(&model)?)
        .context("writing model artifact")?;
    Ok(())
}
