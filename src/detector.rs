//! Detector façade (C5): each of the four factors is a uniform object
//! exposing `score(session, history) -> u8`. Internally: extract ->
//! normalize -> model-predict (or skip) -> overlay rules -> clamp. A
//! detector with a missing/mismatched artifact runs rules-only against a
//! neutral base of 50 and never errors (spec.md §4.5, §9).

use crate::bundle::ModelBundle;
use crate::features;
use crate::models::{autoencoder, dbscan, isolation_forest, svm};
use crate::rules;
use crate::session::{HistoryItem, Session};
use std::collections::HashSet;

const NEUTRAL_BASE: u8 = 50;

pub struct NetworkDetector {
    bundle: Option<ModelBundle>,
    known_bad_addresses: HashSet<String>,
}

impl NetworkDetector {
    pub fn new(bundle: Option<ModelBundle>, known_bad_addresses: HashSet<String>) -> Self {
        Self { bundle, known_bad_addresses }
    }

    pub fn score(&self, session: &Session, history: &[HistoryItem]) -> u8 {
        let raw = features::network::extract(session, history);
        let base = self.bundle.as_ref().and_then(|b| svm::score(b, &raw)).unwrap_or(NEUTRAL_BASE);
        let parsed = features::network::parsed_current_ip(session);
        rules::network::apply(base, session, &parsed, history, &self.known_bad_addresses)
    }
}

pub struct TemporalDetector {
    bundle: Option<ModelBundle>,
}

impl TemporalDetector {
    pub fn new(bundle: Option<ModelBundle>) -> Self {
        Self { bundle }
    }

    pub fn score(&self, session: &Session, history: &[HistoryItem]) -> u8 {
        let raw = features::temporal::extract(session, history);
        let base = self.bundle.as_ref().and_then(|b| isolation_forest::score(b, &raw)).unwrap_or(NEUTRAL_BASE);
        rules::temporal::apply(base, session, history)
    }
}

pub struct UserAgentDetector {
    bundle: Option<ModelBundle>,
}

impl UserAgentDetector {
    pub fn new(bundle: Option<ModelBundle>) -> Self {
        Self { bundle }
    }

    pub fn score(&self, session: &Session, history: &[HistoryItem]) -> u8 {
        let raw = features::useragent::extract(session);
        let base = self.bundle.as_ref().and_then(|b| autoencoder::score(b, &raw)).unwrap_or(NEUTRAL_BASE);
        let parsed = crate::useragent_parse::parse(&session.user_agent);
        let ruled = rules::useragent::apply(base, session, &parsed, history);
        rules::useragent::apply_touch_inconsistency(ruled, &parsed, session.fingerprint.touch_support)
    }
}

pub struct GeoDetector {
    bundle: Option<ModelBundle>,
    max_travel_speed_kmh: f64,
}

impl GeoDetector {
    pub fn new(bundle: Option<ModelBundle>, max_travel_speed_kmh: f64) -> Self {
        Self { bundle, max_travel_speed_kmh }
    }

    pub fn score(&self, session: &Session, history: &[HistoryItem]) -> u8 {
        let (ctx, raw) = features::geo::extract(session, history, self.max_travel_speed_kmh);
        let base = self
            .bundle
            .as_ref()
            .and_then(|b| dbscan::score(b, &raw, ctx.recent_speed_kmh))
            .unwrap_or_else(|| dbscan::apply_travel_floor(NEUTRAL_BASE, ctx.recent_speed_kmh));
        rules::geo::apply(base, session, history, &ctx.current_country, ctx.recent_speed_kmh)
    }
}

/// Bundles loaded at startup for all four factors, by their expected
/// algorithm tag, feature count, and model-bundle version (spec.md §4.3.5).
pub struct Detectors {
    pub network: NetworkDetector,
    pub temporal: TemporalDetector,
    pub useragent: UserAgentDetector,
    pub geo: GeoDetector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Fingerprint;

    fn session(ip: &str, ua: &str, ts: i64) -> Session {
        Session { ip: ip.to_string(), user_agent: ua.to_string(), timestamp: ts, location: None, fingerprint: Fingerprint::default() }
    }

    #[test]
    fn rules_only_network_detector_never_errors_and_stays_in_range() {
        let detector = NetworkDetector::new(None, HashSet::new());
        let score = detector.score(&session("8.8.8.8", "x", 0), &[]);
        assert!(score <= 100);
    }

    #[test]
    fn rules_only_useragent_detector_floors_on_bot() {
        let detector = UserAgentDetector::new(None);
        let score = detector.score(&session("1.2.3.4", "curl/7.0 bot", 0), &[]);
        assert!(score >= 80);
    }

    #[test]
    fn rules_only_geo_detector_applies_physics_floor() {
        let detector = GeoDetector::new(None, 900.0);
        let mut far = session("1.2.3.4", "x", 1_700_000_000_000 + 42 * 60 * 1000);
        far.location = Some(crate::session::Location {
            country: "United Kingdom".to_string(),
            city: "London".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
        });
        let history = vec![HistoryItem {
            ip: "5.6.7.8".to_string(),
            user_agent: "x".to_string(),
            timestamp: 1_700_000_000_000,
            location: crate::session::Location {
                country: "United States".to_string(),
                city: "New York".to_string(),
                latitude: 40.7128,
                longitude: -74.0060,
            },
            status: crate::session::LoginOutcome::Success,
        }];
        let score = detector.score(&far, &history);
        assert!(score >= 85);
    }
}
