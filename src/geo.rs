//! Great-circle distance, travel speed, impossible-travel predicate, and
//! the static country-risk table. Grounded on
//! `original_source/utils/geo_utils.py`.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// High-risk countries for cybercrime (same list/scores as the Python original).
const HIGH_RISK_COUNTRIES: &[(&str, u8)] = &[
    ("North Korea", 95),
    ("Iran", 85),
    ("China", 75),
    ("Russia", 75),
    ("Nigeria", 70),
    ("Romania", 65),
    ("Brazil", 60),
    ("India", 55),
    ("Vietnam", 55),
    ("Indonesia", 50),
];

/// Low-risk countries.
const LOW_RISK_COUNTRIES: &[(&str, u8)] = &[
    ("United States", 10),
    ("Canada", 10),
    ("United Kingdom", 10),
    ("Germany", 10),
    ("France", 10),
    ("Australia", 10),
    ("Japan", 10),
    ("South Korea", 15),
    ("Singapore", 15),
    ("Netherlands", 15),
];

const DEFAULT_COUNTRY_RISK: u8 = 30;

/// Great-circle distance in km on a spherical Earth of radius 6371 km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1_r, lon1_r) = (lat1.to_radians(), lon1.to_radians());
    let (lat2_r, lon2_r) = (lat2.to_radians(), lon2.to_radians());

    let dlat = lat2_r - lat1_r;
    let dlon = lon2_r - lon1_r;

    let a = (dlat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Travel speed in km/h, given a distance and elapsed time. `delta_ms` is
/// floored at 1 ms to avoid division by zero, per spec.md §4.2.
pub fn travel_speed_kmh(distance_km: f64, delta_ms: i64) -> f64 {
    let hours = (delta_ms.max(1) as f64) / (1000.0 * 60.0 * 60.0);
    distance_km / hours
}

/// True if the implied travel speed between two located logins exceeds the
/// configured maximum feasible speed.
pub fn is_impossible_travel(
    lat1: f64,
    lon1: f64,
    ts1: i64,
    lat2: f64,
    lon2: f64,
    ts2: i64,
    max_speed_kmh: f64,
) -> bool {
    travel_speed(lat1, lon1, ts1, lat2, lon2, ts2) > max_speed_kmh
}

/// Travel speed implied between two located, timestamped logins.
pub fn travel_speed(lat1: f64, lon1: f64, ts1: i64, lat2: f64, lon2: f64, ts2: i64) -> f64 {
    let distance = haversine_km(lat1, lon1, lat2, lon2);
    let delta_ms = (ts2 - ts1).abs();
    travel_speed_kmh(distance, delta_ms)
}

/// Country-risk lookup, 0-100, default 30 for unknown countries.
pub fn country_risk_score(country: &str) -> u8 {
    if let Some((_, score)) = HIGH_RISK_COUNTRIES.iter().find(|(name, _)| *name == country) {
        return *score;
    }
    if let Some((_, score)) = LOW_RISK_COUNTRIES.iter().find(|(name, _)| *name == country) {
        return *score;
    }
    DEFAULT_COUNTRY_RISK
}

pub fn is_high_risk_country(country: &str) -> bool {
    HIGH_RISK_COUNTRIES.iter().any(|(name, _)| *name == country)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NYC: (f64, f64) = (40.7128, -74.0060);
    const LON: (f64, f64) = (51.5074, -0.1278);

    #[test]
    fn haversine_symmetry() {
        let d1 = haversine_km(NYC.0, NYC.1, LON.0, LON.1);
        let d2 = haversine_km(LON.0, LON.1, NYC.0, NYC.1);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn haversine_triangle_inequality() {
        let tokyo = (35.6762, 139.6503);
        let d_ac = haversine_km(NYC.0, NYC.1, tokyo.0, tokyo.1);
        let d_ab = haversine_km(NYC.0, NYC.1, LON.0, LON.1);
        let d_bc = haversine_km(LON.0, LON.1, tokyo.0, tokyo.1);
        assert!(d_ac <= d_ab + d_bc + 1e-9);
    }

    #[test]
    fn nyc_to_london_is_impossible_in_under_an_hour() {
        // ~5570 km in 42 minutes implies well over 900 km/h.
        let ts1 = 0i64;
        let ts2 = 42 * 60 * 1000;
        assert!(is_impossible_travel(NYC.0, NYC.1, ts1, LON.0, LON.1, ts2, 900.0));
    }

    #[test]
    fn impossible_travel_monotonic_in_delta_t() {
        let ts1 = 0i64;
        let short = travel_speed(NYC.0, NYC.1, ts1, LON.0, LON.1, 10 * 60 * 1000);
        let long = travel_speed(NYC.0, NYC.1, ts1, LON.0, LON.1, 120 * 60 * 1000);
        assert!(short >= long);
    }

    #[test]
    fn country_risk_defaults_to_thirty() {
        assert_eq!(country_risk_score("Atlantis"), 30);
    }

    #[test]
    fn known_high_and_low_risk_scores() {
        assert_eq!(country_risk_score("Russia"), 75);
        assert_eq!(country_risk_score("Germany"), 10);
    }
}
