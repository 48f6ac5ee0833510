//! Client-agent factor — reconstruction-error detector (spec.md §4.3.3).
//! A dense autoencoder trained to reconstruct its own input; large
//! reconstruction error signals a fingerprint unlike anything seen before.

use crate::bundle::{ModelBundle, ModelParams};

fn mean_squared_error(input: &[f64], output: &[f64]) -> f64 {
    if input.is_empty() {
        return 0.0;
    }
    input.iter().zip(output.iter()).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / input.len() as f64
}

fn reconstruct(layers: &[crate::bundle::DenseLayer], input: &[f64]) -> Vec<f64> {
    let mut activations = input.to_vec();
    for layer in layers {
        activations = layer.forward(&activations);
    }
    activations
}

/// Map reconstruction error `m` against training threshold `tau` to a base
/// score in `[0, 100]` per spec.md §4.3.3's exact piecewise formula.
pub fn error_to_base_score(m: f64, tau: f64) -> f64 {
    if tau <= 0.0 {
        return 50.0;
    }
    if m <= tau {
        (30.0 * (m / tau)).floor()
    } else {
        30.0 + (70.0 * (1.0 - (-5.0 * (m / tau - 1.0)).exp())).floor()
    }
}

pub fn score(bundle: &ModelBundle, raw_features: &[f64]) -> Option<u8> {
    let ModelParams::Autoencoder { layers } = &bundle.params else {
        return None;
    };
    let Some(tau) = bundle.threshold else {
        // No training-time threshold persisted: cannot judge reconstruction
        // error, degrade to neutral rather than guessing.
        return Some(50);
    };
    if layers.is_empty() {
        return Some(50);
    }
    let scaled = bundle.normalizer.transform(raw_features);
    let output = reconstruct(layers, &scaled);
    let m = mean_squared_error(&scaled, &output);
    Some(super::clamp_score(error_to_base_score(m, tau)))
}
