//! Network factor — one-class boundary detector (spec.md §4.3.1).
//! RBF-kernel one-class SVM, ν≈0.05 at training time; here only the
//! decision function is evaluated.

use crate::bundle::{ModelBundle, ModelParams};

/// Evaluate the RBF-kernel one-class SVM decision function:
/// d(x) = sum_i(dual_coef_i * exp(-gamma * ||x - sv_i||^2)) - rho.
/// Positive = inlier, negative = outlier.
fn decision_function(features: &[f64], support_vectors: &[Vec<f64>], dual_coef: &[f64], gamma: f64, rho: f64) -> f64 {
    let sum: f64 = support_vectors
        .iter()
        .zip(dual_coef.iter())
        .map(|(sv, &coef)| {
            let sq_dist: f64 = features.iter().zip(sv.iter()).map(|(a, b)| (a - b).powi(2)).sum();
            coef * (-gamma * sq_dist).exp()
        })
        .sum();
    sum - rho
}

/// Map a decision-function value to a base score in `[0, 100]`:
/// inliers (d >= 0) land in the 0–30 band, proportional to distance from
/// the boundary; outliers (d < 0) land in the 31–100 band.
pub fn decision_to_base_score(d: f64) -> f64 {
    if d >= 0.0 {
        30.0 * (-d).exp()
    } else {
        31.0 + 69.0 * (1.0 - d.exp())
    }
}

pub fn score(bundle: &ModelBundle, raw_features: &[f64]) -> Option<u8> {
    let ModelParams::OneClassSvm { support_vectors, dual_coef, gamma, rho } = &bundle.params else {
        return None;
    };
    if support_vectors.is_empty() {
        // An untrained/empty bundle behaves as a neutral boundary.
        return Some(50);
    }
    let scaled = bundle.normalizer.transform(raw_features);
    let d = decision_function(&scaled, support_vectors, dual_coef, *gamma, *rho);
    Some(super::clamp_score(decision_to_base_score(d)))
}
