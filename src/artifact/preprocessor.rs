use serde::{Deserialize, Serialize};

use super::{FeatureMatrix, Preprocessor};
use crate::data::model::Table;
use crate::error::InferenceError;

// ---------------------------------------------------------------------------
// Serialized preprocessors
// ---------------------------------------------------------------------------

/// A fitted preprocessor as written by the training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreprocessorArtifact {
    ImputeScale(ImputeScale),
    Passthrough(Passthrough),
}

/// Imputation followed by centering and scaling, per column:
/// `x = if missing { fill } else { x }; (x - center) / scale`.
///
/// Covers both a mean/std scaler and a median/IQR robust scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputeScale {
    pub columns: Vec<String>,
    pub fill: Vec<f64>,
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Select columns as they are, replacing missing values with `fill_missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passthrough {
    pub columns: Vec<String>,
    #[serde(default)]
    pub fill_missing: f64,
}

impl PreprocessorArtifact {
    /// Check the fitted vectors line up with the column list.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            PreprocessorArtifact::ImputeScale(p) => {
                let n = p.columns.len();
                let lengths = [
                    ("fill", p.fill.len()),
                    ("center", p.center.len()),
                    ("scale", p.scale.len()),
                ];
                for (name, len) in lengths {
                    if len != n {
                        return Err(format!("{name} has {len} values for {n} columns"));
                    }
                }
                Ok(())
            }
            PreprocessorArtifact::Passthrough(_) => Ok(()),
        }
    }
}

impl Preprocessor for PreprocessorArtifact {
    fn transform(&self, table: &Table) -> Result<FeatureMatrix, InferenceError> {
        match self {
            PreprocessorArtifact::ImputeScale(p) => p.transform(table),
            PreprocessorArtifact::Passthrough(p) => p.transform(table),
        }
    }
}

impl Preprocessor for ImputeScale {
    fn transform(&self, table: &Table) -> Result<FeatureMatrix, InferenceError> {
        let mut features = select_numeric(table, &self.columns)?;
        for row in &mut features.rows {
            for (j, x) in row.iter_mut().enumerate() {
                if x.is_nan() {
                    *x = self.fill[j];
                }
                // A constant column was fitted with zero spread.
                let scale = if self.scale[j] == 0.0 { 1.0 } else { self.scale[j] };
                *x = (*x - self.center[j]) / scale;
            }
        }
        Ok(features)
    }
}

impl Preprocessor for Passthrough {
    fn transform(&self, table: &Table) -> Result<FeatureMatrix, InferenceError> {
        let mut features = select_numeric(table, &self.columns)?;
        for x in features.rows.iter_mut().flatten() {
            if x.is_nan() {
                *x = self.fill_missing;
            }
        }
        Ok(features)
    }
}

/// Pull `columns` out of `table` as floats, missing cells as `NaN`.
fn select_numeric(table: &Table, columns: &[String]) -> Result<FeatureMatrix, InferenceError> {
    let indices = columns
        .iter()
        .map(|col| {
            table
                .column_index(col)
                .ok_or_else(|| InferenceError::MissingColumn(col.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row_no, row)| {
            indices
                .iter()
                .zip(columns)
                .map(|(&idx, col)| {
                    row[idx].as_f64().ok_or_else(|| InferenceError::NonNumeric {
                        column: col.clone(),
                        row: row_no,
                        value: row[idx].to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureMatrix {
        columns: columns.to_vec(),
        rows,
    })
}
