use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_predictor::{
    LoadError, PipelineError, PredictionPipeline, PredictionPipelineConfig, UploadRequest,
    UploadedFile,
};
use tempfile::TempDir;

const SENSOR_CSV: &str = "\
,Wafer,Sensor-1,Sensor-2
0,Wafer-801,2968.33,2468.75
1,Wafer-802,2961.04,
2,Wafer-803,3072.03,2500.68
3,Wafer-804,2879.11,2457.51
";

fn write_artifacts(config: &PredictionPipelineConfig) {
    fs::create_dir_all(&config.artifact_dir).unwrap();
    fs::write(
        config.preprocessor_path(),
        r#"{
            "kind": "impute_scale",
            "columns": ["Sensor-1", "Sensor-2"],
            "fill": [2960.0, 2470.0],
            "center": [2970.0, 2475.0],
            "scale": [50.0, 20.0]
        }"#,
    )
    .unwrap();
    fs::write(
        config.model_file_path(),
        r#"{"kind": "logistic_regression", "weights": [1.5, -0.5], "intercept": 0.0}"#,
    )
    .unwrap();
}

fn read_output(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

#[test]
fn test_csv_upload_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = PredictionPipelineConfig::default().rooted_at(dir.path());
    write_artifacts(&config);

    let upload = UploadedFile::new("wafers.csv", SENSOR_CSV);
    let request = UploadRequest::new().with_file("file", upload);
    let mut pipeline = PredictionPipeline::new(&request, config);
    let out_path = pipeline.run_pipeline().unwrap().prediction_file_path();

    let (headers, rows) = read_output(&out_path);
    assert_eq!(headers, ["Wafer", "Sensor-1", "Sensor-2", "TARGET_COLUMN"]);
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r[3] == "bad" || r[3] == "good"));

    // (2968.33 - 2970) / 50 * 1.5 - (2468.75 - 2475) / 20 * 0.5 > 0 → good
    assert_eq!(rows[0][3], "good");
    // (2879.11 - 2970) / 50 * 1.5 dominates → bad
    assert_eq!(rows[3][3], "bad");
    // missing reading is written back empty
    assert_eq!(rows[1][2], "");
}

#[test]
fn test_parquet_upload_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = PredictionPipelineConfig::default().rooted_at(dir.path());
    write_artifacts(&config);

    let schema = Arc::new(Schema::new(vec![
        Field::new("Wafer", DataType::Utf8, false),
        Field::new("Sensor-1", DataType::Float64, true),
        Field::new("Sensor-2", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["Wafer-801", "Wafer-802"])),
        Arc::new(Float64Array::from(vec![Some(3100.0), Some(2800.0)])),
        Arc::new(Float64Array::from(vec![None, Some(2475.0)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut bytes = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut bytes, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let upload = UploadedFile::new("wafers.parquet", bytes);
    let request = UploadRequest::new().with_file("file", upload);
    let mut pipeline = PredictionPipeline::new(&request, config);
    let out_path = pipeline.run_pipeline().unwrap().prediction_file_path();

    let (headers, rows) = read_output(&out_path);
    assert_eq!(headers, ["Wafer", "Sensor-1", "Sensor-2", "TARGET_COLUMN"]);
    assert_eq!(rows[0], ["Wafer-801", "3100.0", "", "good"]);
    assert_eq!(rows[1], ["Wafer-802", "2800.0", "2475.0", "bad"]);
}

#[test]
fn test_config_file_drives_paths() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("pipeline.toml");
    fs::write(
        &config_path,
        concat!(
            "upload_field = \"dataset\"\n",
            "target_column = \"Good/Bad\"\n",
            "prediction_file_name = \"labelled.csv\"\n",
        ),
    )
    .unwrap();
    let config = PredictionPipelineConfig::load_from_path(&config_path)
        .unwrap()
        .rooted_at(dir.path());
    write_artifacts(&config);

    let upload = UploadedFile::new("wafers.csv", SENSOR_CSV);
    let request = UploadRequest::new().with_file("dataset", upload);
    let mut pipeline = PredictionPipeline::new(&request, config);
    let out_path = pipeline.run_pipeline().unwrap().prediction_file_path();

    assert!(out_path.ends_with("predictions/labelled.csv"));
    let (headers, rows) = read_output(&out_path);
    assert_eq!(headers.last().map(String::as_str), Some("Good/Bad"));
    assert_eq!(rows.len(), 4);
}

#[test]
fn test_missing_markers_and_short_rows_are_imputed() {
    let dir = TempDir::new().unwrap();
    let config = PredictionPipelineConfig::default().rooted_at(dir.path());
    fs::create_dir_all(&config.artifact_dir).unwrap();
    fs::write(
        config.preprocessor_path(),
        r#"{
            "kind": "impute_scale",
            "columns": ["s1", "s2"],
            "fill": [0.0, 0.0],
            "center": [0.0, 0.0],
            "scale": [1.0, 1.0]
        }"#,
    )
    .unwrap();
    fs::write(
        config.model_file_path(),
        r#"{"kind": "logistic_regression", "weights": [1.0, -1.0], "intercept": 0.0}"#,
    )
    .unwrap();

    let upload = UploadedFile::new("in.csv", "w,s1,s2\na,1.0,NA\nb,NULL,2.0\nc,3.0\n");
    let request = UploadRequest::new().with_file("file", upload);
    let mut pipeline = PredictionPipeline::new(&request, config);
    let out_path = pipeline.run_pipeline().unwrap().prediction_file_path();

    assert_eq!(
        fs::read_to_string(out_path).unwrap(),
        "w,s1,s2,TARGET_COLUMN\na,1.0,,good\nb,,2.0,bad\nc,3.0,,good\n"
    );
}

#[test]
fn test_corrupt_model_artifact() {
    let dir = TempDir::new().unwrap();
    let config = PredictionPipelineConfig::default().rooted_at(dir.path());
    write_artifacts(&config);
    fs::write(config.model_file_path(), b"\x80\x04\x95\x00").unwrap();
    let out_path = config.prediction_file_path();

    let upload = UploadedFile::new("wafers.csv", SENSOR_CSV);
    let request = UploadRequest::new().with_file("file", upload);
    let mut pipeline = PredictionPipeline::new(&request, config);

    let err = pipeline.run_pipeline().unwrap_err();
    assert!(matches!(err, PipelineError::Load(LoadError::Corrupt { .. })));
    assert!(!out_path.exists());
}
