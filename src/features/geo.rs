//! Geographic factor feature extraction (spec.md §4.1, §4.2).
//!
//! The extractor produces 7 pure features (no trained state required).
//! The normalized form of this vector is what `models::dbscan` measures
//! distance against: "distance from nearest known cluster centroid"
//! (spec.md §4.1) is the model's *output*, derived by comparing this
//! vector to the bundle's retained core samples, not a feature the
//! extractor itself computes.

use crate::geo;
use crate::session::{HistoryItem, Session};

pub const LEN: usize = 7;

#[derive(Debug, Clone)]
pub struct GeoContext {
    /// The current session's location — always present after enrichment
    /// (falls back to `Location::unknown()` on a lookup miss, never the
    /// caller's guess).
    pub current_lat: f64,
    pub current_lon: f64,
    pub current_country: String,
    pub current_city: String,
    /// Travel speed vs. the most recent *located* history item, km/h.
    /// `None` when there is no prior located login.
    pub recent_speed_kmh: Option<f64>,
    pub impossible_travel: bool,
}

pub fn extract(session: &Session, history: &[HistoryItem], max_travel_speed_kmh: f64) -> (GeoContext, [f64; LEN]) {
    let current = session.location.clone().unwrap_or_else(crate::session::Location::unknown);

    if history.is_empty() {
        let ctx = GeoContext {
            current_lat: current.latitude,
            current_lon: current.longitude,
            current_country: current.country.clone(),
            current_city: current.city.clone(),
            recent_speed_kmh: None,
            impossible_travel: false,
        };
        let country_risk = geo::country_risk_score(&current.country) as f64 / 100.0;
        return (ctx, [1.0, 1.0, country_risk, 0.0, 0.0, 0.0, 0.0]);
    }

    let is_new_country = !history.iter().any(|h| h.location.country == current.country);
    let is_new_city = !history.iter().any(|h| h.location.city == current.city);

    let distances: Vec<f64> = history
        .iter()
        .map(|h| geo::haversine_km(current.latitude, current.longitude, h.location.latitude, h.location.longitude))
        .collect();

    let avg_distance = distances.iter().sum::<f64>() / distances.len() as f64;
    let max_distance = distances.iter().cloned().fold(0.0, f64::max);
    let variance = if distances.len() > 1 {
        let mean = avg_distance;
        (distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / distances.len() as f64).sqrt()
    } else {
        0.0
    };

    // Most recent history item by timestamp, to compute impossible travel.
    let last = history.iter().max_by_key(|h| h.timestamp).unwrap();
    let speed = geo::travel_speed(current.latitude, current.longitude, session.timestamp, last.location.latitude, last.location.longitude, last.timestamp);
    let impossible_travel = speed > max_travel_speed_kmh;

    let country_risk = geo::country_risk_score(&current.country) as f64 / 100.0;

    let ctx = GeoContext {
        current_lat: current.latitude,
        current_lon: current.longitude,
        current_country: current.country.clone(),
        current_city: current.city.clone(),
        recent_speed_kmh: Some(speed),
        impossible_travel,
    };

    let vector = [
        bool_f(is_new_country),
        bool_f(is_new_city),
        country_risk,
        (avg_distance / 5000.0).min(1.0),
        (max_distance / 10000.0).min(1.0),
        bool_f(impossible_travel),
        (variance / 1000.0).min(1.0),
    ];

    (ctx, vector)
}

fn bool_f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
