//! Geographic rule overlay (spec.md §4.4, fourth bullet). The physics
//! floor itself lives in `models::dbscan` (it is authoritative over the
//! model's own base score); this module re-asserts it defensively, then
//! layers the remaining country/velocity signals.

use super::clamp_u32;
use crate::models::dbscan;
use crate::session::{HistoryItem, Session};

const LAST_24H_MS: i64 = 24 * 60 * 60 * 1000;

pub fn apply(base: u8, session: &Session, history: &[HistoryItem], current_country: &str, recent_speed_kmh: Option<f64>) -> u8 {
    let mut score = dbscan::apply_travel_floor(base, recent_speed_kmh) as u32;

    let cutoff = session.timestamp - LAST_24H_MS;
    let distinct_countries_24h = history
        .iter()
        .filter(|h| h.timestamp > cutoff)
        .map(|h| h.location.country.as_str())
        .chain(std::iter::once(current_country))
        .collect::<std::collections::HashSet<_>>()
        .len();
    if distinct_countries_24h > 3 {
        score += 20;
    }

    if crate::geo::is_high_risk_country(current_country) {
        score += 15;
    }

    if let Some(speed) = recent_speed_kmh {
        if speed > 500.0 && speed <= 900.0 {
            score += 20;
        }
    }

    clamp_u32(score)
}
