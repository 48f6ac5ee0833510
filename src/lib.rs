//! Login-risk scoring engine: four independent anomaly detectors
//! (network, temporal, client-agent, geographic) fused into a single
//! verdict under a strict per-request latency budget.

pub mod adapters;
pub mod api;
pub mod bundle;
pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod geo;
pub mod ipaddr_ext;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod schema;
pub mod session;
pub mod useragent_parse;

use crate::adapters::{InProcessCache, InProcessRateLimiter, LoggingAudit, StaticGeoLookup};
use crate::api::AppState;
use crate::bundle::ModelBundle;
use crate::config::Config;
use crate::detector::{Detectors, GeoDetector, NetworkDetector, TemporalDetector, UserAgentDetector};
use log::warn;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

const NETWORK_FEATURE_COUNT: usize = features::network::LEN;
const TEMPORAL_FEATURE_COUNT: usize = features::temporal::LEN;
const USERAGENT_FEATURE_COUNT: usize = features::useragent::LEN;
const GEO_FEATURE_COUNT: usize = features::geo::LEN;

fn load_bundle(dir: &str, file_name: &str, algorithm: &str, feature_count: usize, version: &str) -> Option<ModelBundle> {
    let path = Path::new(dir).join(file_name);
    match ModelBundle::load_checked(&path, algorithm, feature_count, version) {
        Ok(bundle) => Some(bundle),
        Err(e) => {
            warn!("model bundle '{file_name}' unavailable, falling back to rules-only scoring: {e}");
            None
        }
    }
}

/// Build the process-lifetime application state: load whatever model
/// bundles are present (missing/mismatched ones degrade that factor to
/// rules-only, never an error) and wire the in-process C7 adapters.
///
/// Call this exactly once at startup and share the returned `AppState`
/// across all workers via `web::Data`.
pub fn build_app_state(config: Config) -> AppState {
    let network_bundle = load_bundle(&config.model_bundle_dir, "network.json", "one_class_svm", NETWORK_FEATURE_COUNT, &config.bundle_version);
    let temporal_bundle = load_bundle(&config.model_bundle_dir, "temporal.json", "isolation_forest", TEMPORAL_FEATURE_COUNT, &config.bundle_version);
    let useragent_bundle = load_bundle(&config.model_bundle_dir, "useragent.json", "autoencoder", USERAGENT_FEATURE_COUNT, &config.bundle_version);
    let geo_bundle = load_bundle(&config.model_bundle_dir, "geo.json", "dbscan", GEO_FEATURE_COUNT, &config.bundle_version);

    let models_loaded = network_bundle.is_some() && temporal_bundle.is_some() && useragent_bundle.is_some() && geo_bundle.is_some();
    let max_travel_speed_kmh = config.max_travel_speed_kmh;

    let detectors = Arc::new(Detectors {
        network: NetworkDetector::new(network_bundle, HashSet::new()),
        temporal: TemporalDetector::new(temporal_bundle),
        useragent: UserAgentDetector::new(useragent_bundle),
        geo: GeoDetector::new(geo_bundle, max_travel_speed_kmh),
    });

    AppState {
        config,
        detectors,
        geo_lookup: Arc::new(StaticGeoLookup),
        rate_limiter: Arc::new(InProcessRateLimiter::new()),
        result_cache: Arc::new(InProcessCache::new()),
        audit: Arc::new(LoggingAudit),
        models_loaded,
    }
}
