//! Model persistence (C8): the persisted-artifact contract of spec.md
//! §4.3.5 — atomic save/load of normalizer + model parameters + auxiliary
//! state, with load-time mismatch detection that degrades to rules-only
//! mode for the affected factor rather than erroring.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Normalizer {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Normalizer {
    pub fn identity(feature_count: usize) -> Self {
        Self { mean: vec![0.0; feature_count], scale: vec![1.0; feature_count] }
    }

    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(i, &v)| {
                let scale = self.scale.get(i).copied().unwrap_or(1.0);
                let mean = self.mean.get(i).copied().unwrap_or(0.0);
                if scale.abs() < f64::EPSILON {
                    0.0
                } else {
                    (v - mean) / scale
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// `weights[out_idx][in_idx]`.
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(self.biases.iter())
            .map(|(row, &bias)| {
                let dot: f64 = row.iter().zip(input.iter()).map(|(w, x)| w * x).sum();
                self.activation.apply(dot + bias)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelParams {
    /// One-class SVM (RBF kernel) decision function parameters.
    OneClassSvm { support_vectors: Vec<Vec<f64>>, dual_coef: Vec<f64>, gamma: f64, rho: f64 },
    /// Isolation forest: precomputed mean path length per sample is not
    /// portable across implementations, so we persist the simpler
    /// "expected depth per feature-space region" via a set of
    /// axis-aligned split thresholds per tree, sufficient for an
    /// inference-only forward pass.
    IsolationForest { trees: Vec<IsolationTree>, avg_path_length_normal: f64 },
    /// Fully-connected autoencoder, input -> ... -> input.
    Autoencoder { layers: Vec<DenseLayer> },
    /// DBSCAN core samples retained after training, each the normalized
    /// geo feature vector (same width as `feature_count`) of a training
    /// point that survived as a cluster core.
    Dbscan { core_samples: Vec<Vec<f64>> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    pub nodes: Vec<IsolationNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IsolationNode {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { depth: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub algorithm: String,
    pub version: String,
    pub feature_count: usize,
    pub normalizer: Normalizer,
    pub params: ModelParams,
    /// 95th-percentile training reconstruction error, for the
    /// reconstruction-based (autoencoder) detector only.
    pub threshold: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("(de)serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("algorithm mismatch: expected '{expected}', found '{found}'")]
    AlgorithmMismatch { expected: String, found: String },
    #[error("feature count mismatch: expected {expected}, found {found}")]
    FeatureCountMismatch { expected: usize, found: usize },
    #[error("version mismatch: expected '{expected}', found '{found}'")]
    VersionMismatch { expected: String, found: String },
}

impl ModelBundle {
    /// Atomic save: write to a temp file in the same directory, then
    /// rename over the destination, so a reader never observes a
    /// partially written bundle.
    pub fn save_atomic(&self, path: &Path) -> Result<(), BundleError> {
        let tmp_path = path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load and validate against the expected algorithm tag, feature
    /// count, and version. Any mismatch is reported as a typed error;
    /// callers treat this identically to a missing file (rules-only
    /// fallback for that factor).
    pub fn load_checked(
        path: &Path,
        expected_algorithm: &str,
        expected_feature_count: usize,
        expected_version: &str,
    ) -> Result<ModelBundle, BundleError> {
        let bytes = fs::read(path)?;
        let bundle: ModelBundle = serde_json::from_slice(&bytes)?;

        if bundle.algorithm != expected_algorithm {
            return Err(BundleError::AlgorithmMismatch {
                expected: expected_algorithm.to_string(),
                found: bundle.algorithm,
            });
        }
        if bundle.feature_count != expected_feature_count {
            return Err(BundleError::FeatureCountMismatch {
                expected: expected_feature_count,
                found: bundle.feature_count,
            });
        }
        if bundle.version != expected_version {
            return Err(BundleError::VersionMismatch { expected: expected_version.to_string(), found: bundle.version });
        }

        Ok(bundle)
    }
}
