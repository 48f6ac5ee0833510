//! Temporal factor — tree-ensemble isolation (spec.md §4.3.2). 100 trees,
//! contamination≈0.05 at training time; here only the forward pass
//! (average path length, normalized to an anomaly score) is evaluated.

use crate::bundle::{IsolationNode, IsolationTree, ModelBundle, ModelParams};

const DECISION_BOUNDARY: f64 = 0.5;

fn path_length(tree: &IsolationTree, features: &[f64]) -> f64 {
    let mut idx = 0usize;
    loop {
        match tree.nodes.get(idx) {
            Some(IsolationNode::Leaf { depth }) => return *depth as f64,
            Some(IsolationNode::Split { feature, threshold, left, right }) => {
                let value = features.get(*feature).copied().unwrap_or(0.0);
                idx = if value < *threshold { *left } else { *right };
            }
            None => return 0.0,
        }
    }
}

/// Normalized anomaly score per the standard isolation-forest formula
/// s(x,n) = 2^(-E(h(x))/c(n)); s > 0.5 is conventionally anomalous.
pub fn anomaly_score(trees: &[IsolationTree], avg_path_length_normal: f64, features: &[f64]) -> f64 {
    if trees.is_empty() || avg_path_length_normal <= 0.0 {
        return DECISION_BOUNDARY;
    }
    let avg_depth = trees.iter().map(|t| path_length(t, features)).sum::<f64>() / trees.len() as f64;
    2f64.powf(-avg_depth / avg_path_length_normal)
}

/// Map the anomaly score to a base risk in `[0, 100]` per spec.md §4.3.2.
pub fn score_to_base_score(s: f64) -> f64 {
    if s <= DECISION_BOUNDARY {
        30.0 * (s / DECISION_BOUNDARY)
    } else {
        let excess = (s - DECISION_BOUNDARY) / DECISION_BOUNDARY;
        30.0 + 70.0 * (1.0 - (-excess).exp())
    }
}

pub fn score(bundle: &ModelBundle, raw_features: &[f64]) -> Option<u8> {
    let ModelParams::IsolationForest { trees, avg_path_length_normal } = &bundle.params else {
        return None;
    };
    let scaled = bundle.normalizer.transform(raw_features);
    let s = anomaly_score(trees, *avg_path_length_normal, &scaled);
    Some(super::clamp_score(score_to_base_score(s)))
}
