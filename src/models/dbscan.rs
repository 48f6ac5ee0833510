//! Geographic factor — density-based outlier detector (spec.md §4.3.4).
//! Distance to the nearest retained core sample stands in for cluster
//! membership; an authoritative physics floor overrides the model score
//! whenever the implied travel speed is itself impossible.

use crate::bundle::{ModelBundle, ModelParams};

const EPS: f64 = 0.3;

/// Minimum Euclidean distance from `point` (a normalized geo feature
/// vector) to any retained core sample, on the scaled feature space.
/// `f64::INFINITY` when there are no core samples (untrained model).
pub fn nearest_core_distance(core_samples: &[Vec<f64>], point: &[f64]) -> f64 {
    core_samples
        .iter()
        .map(|sample| sample.iter().zip(point.iter()).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt())
        .fold(f64::INFINITY, f64::min)
}

/// Map nearest-core distance to a base score in `[0, 100]` per spec.md
/// §4.3.4: within `EPS` scales 0–30 linearly, beyond it climbs toward 100.
pub fn distance_to_base_score(dist: f64) -> f64 {
    if !dist.is_finite() {
        return 50.0;
    }
    if dist <= EPS {
        30.0 * (dist / EPS)
    } else {
        let excess = (dist - EPS) / EPS;
        30.0 + 70.0 * (1.0 - (-excess).exp())
    }
}

/// Authoritative impossible-travel floor (spec.md §4.3.4): raises — never
/// lowers — the base score when the implied speed itself is physically
/// implausible, independent of what the density model says.
pub fn apply_travel_floor(base: u8, recent_speed_kmh: Option<f64>) -> u8 {
    match recent_speed_kmh {
        Some(speed) if speed > 2000.0 => base.max(95),
        Some(speed) if speed > 900.0 => base.max(85),
        _ => base,
    }
}

/// Score a raw geo feature vector against the bundle's retained core
/// samples, on the normalizer-scaled space (spec.md §4.3.4).
pub fn score(bundle: &ModelBundle, raw_features: &[f64], recent_speed_kmh: Option<f64>) -> Option<u8> {
    let ModelParams::Dbscan { core_samples } = &bundle.params else {
        return None;
    };
    let base = if core_samples.is_empty() {
        50
    } else {
        let point = bundle.normalizer.transform(raw_features);
        let dist = nearest_core_distance(core_samples, &point);
        super::clamp_score(distance_to_base_score(dist))
    };
    Some(apply_travel_floor(base, recent_speed_kmh))
}
