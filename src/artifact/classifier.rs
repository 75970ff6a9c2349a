use serde::{Deserialize, Serialize};

use super::{FeatureMatrix, Model};
use crate::error::InferenceError;

/// A fitted binary classifier as written by the training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    NearestCentroid(NearestCentroid),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Probability at or above which a row is class 1.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// Assigns the class of the closest centroid (Euclidean distance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestCentroid {
    pub classes: Vec<i64>,
    pub centroids: Vec<Vec<f64>>,
}

impl ClassifierArtifact {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierArtifact::LogisticRegression(m) => {
                if !(0.0..=1.0).contains(&m.threshold) {
                    return Err(format!("threshold {} is outside [0, 1]", m.threshold));
                }
                Ok(())
            }
            ClassifierArtifact::NearestCentroid(m) => {
                if m.classes.is_empty() || m.classes.len() != m.centroids.len() {
                    return Err(format!(
                        "{} classes for {} centroids",
                        m.classes.len(),
                        m.centroids.len()
                    ));
                }
                let dim = m.centroids[0].len();
                if m.centroids.iter().any(|c| c.len() != dim) {
                    return Err("centroids have different dimensions".to_string());
                }
                Ok(())
            }
        }
    }

    fn n_features(&self) -> usize {
        match self {
            ClassifierArtifact::LogisticRegression(m) => m.weights.len(),
            ClassifierArtifact::NearestCentroid(m) => m.centroids.first().map_or(0, Vec::len),
        }
    }
}

impl Model for ClassifierArtifact {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<i64>, InferenceError> {
        let expected = self.n_features();
        if features.n_features() != expected {
            return Err(InferenceError::FeatureCount {
                expected,
                got: features.n_features(),
            });
        }
        let codes = features
            .rows
            .iter()
            .map(|row| match self {
                ClassifierArtifact::LogisticRegression(m) => m.classify(row),
                ClassifierArtifact::NearestCentroid(m) => m.classify(row),
            })
            .collect();
        Ok(codes)
    }
}

impl LogisticRegression {
    pub fn probability(&self, row: &[f64]) -> f64 {
        let z: f64 = self.intercept + self.weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }

    fn classify(&self, row: &[f64]) -> i64 {
        i64::from(self.probability(row) >= self.threshold)
    }
}

impl NearestCentroid {
    fn classify(&self, row: &[f64]) -> i64 {
        let distance = |c: &[f64]| -> f64 { c.iter().zip(row).map(|(a, b)| (a - b).powi(2)).sum() };
        self.centroids
            .iter()
            .zip(&self.classes)
            .min_by(|(a, _), (b, _)| distance(a.as_slice()).total_cmp(&distance(b.as_slice())))
            .map(|(_, &class)| class)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let n = rows.first().map_or(0, Vec::len);
        FeatureMatrix {
            columns: (0..n).map(|i| format!("f{i}")).collect(),
            rows,
        }
    }

    #[test]
    fn test_logistic_regression() {
        let model = ClassifierArtifact::LogisticRegression(LogisticRegression {
            weights: vec![2.0, -1.0],
            intercept: 0.5,
            threshold: 0.5,
        });
        let codes = model
            .predict(&matrix(vec![vec![1.0, 0.0], vec![-1.0, 1.0], vec![0.0, 0.5]]))
            .unwrap();
        // z = 2.5, -2.5, 0.0 → p >= 0.5 for the first and last
        assert_eq!(codes, vec![1, 0, 1]);
    }

    #[test]
    fn test_logistic_probability() {
        let model = LogisticRegression {
            weights: vec![1.0],
            intercept: 0.0,
            threshold: 0.5,
        };
        assert!((model.probability(&[0.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_centroid() {
        let model = ClassifierArtifact::NearestCentroid(NearestCentroid {
            classes: vec![0, 1],
            centroids: vec![vec![0.0, 0.0], vec![10.0, 10.0]],
        });
        let codes = model
            .predict(&matrix(vec![vec![1.0, 2.0], vec![9.0, 7.0]]))
            .unwrap();
        assert_eq!(codes, vec![0, 1]);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let model = ClassifierArtifact::LogisticRegression(LogisticRegression {
            weights: vec![1.0, 1.0],
            intercept: 0.0,
            threshold: 0.5,
        });
        let err = model.predict(&matrix(vec![vec![1.0]])).unwrap_err();
        assert!(matches!(err, InferenceError::FeatureCount { expected: 2, got: 1 }));
    }

    #[test]
    fn test_default_threshold() {
        let artifact: ClassifierArtifact = serde_json::from_str(
            r#"{"kind": "logistic_regression", "weights": [0.1], "intercept": -1.0}"#,
        )
        .unwrap();
        match artifact {
            ClassifierArtifact::LogisticRegression(m) => assert_eq!(m.threshold, 0.5),
            other => panic!("Expected LogisticRegression, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_centroids() {
        let artifact = ClassifierArtifact::NearestCentroid(NearestCentroid {
            classes: vec![0, 1],
            centroids: vec![vec![0.0]],
        });
        assert!(artifact.validate().is_err());
    }
}
