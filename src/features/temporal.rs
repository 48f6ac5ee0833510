//! Temporal factor, 10 features (spec.md §4.1).

use crate::session::{HistoryItem, Session};
use chrono::{DateTime, Datelike, Timelike, Utc};

pub const LEN: usize = 10;
const MS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;
const WEEK_HOURS: f64 = 24.0 * 7.0;
const CIRCULAR_MEAN_WINDOW: usize = 20;

fn to_datetime(ts_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts_ms).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
}

/// Circular mean of a set of hours-of-day, via the unit-circle trick:
/// mean over exp(i * 2*pi*h/24). Returns `None` for an empty slice.
pub fn circular_mean_hour(hours: &[u32]) -> Option<f64> {
    if hours.is_empty() {
        return None;
    }
    let n = hours.len() as f64;
    let (sin_sum, cos_sum) = hours.iter().fold((0.0, 0.0), |(s, c), &h| {
        let angle = (h as f64) * (2.0 * std::f64::consts::PI / 24.0);
        (s + angle.sin(), c + angle.cos())
    });
    let mean_angle = (sin_sum / n).atan2(cos_sum / n);
    let mut mean_hour = mean_angle * (24.0 / (2.0 * std::f64::consts::PI));
    if mean_hour < 0.0 {
        mean_hour += 24.0;
    }
    Some(mean_hour)
}

fn circular_hour_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    diff.min(24.0 - diff)
}

pub fn extract(session: &Session, history: &[HistoryItem]) -> [f64; LEN] {
    let dt = to_datetime(session.timestamp);
    let hour = dt.hour();
    // chrono's weekday 0=Monday .. 6=Sunday, matching the spec's convention.
    let day_of_week = dt.weekday().num_days_from_monday();
    let is_weekend = day_of_week >= 5;
    let is_business_hours = (9..18).contains(&hour);
    let is_night = !(6..22).contains(&hour);

    let mut sorted_history: Vec<&HistoryItem> = history.iter().collect();
    sorted_history.sort_by_key(|h| h.timestamp);

    let hours_since_last_login = sorted_history
        .last()
        .map(|h| ((session.timestamp - h.timestamp) as f64 / MS_PER_HOUR).max(0.0))
        .unwrap_or(WEEK_HOURS);
    let hours_since_last_login_capped = hours_since_last_login.min(WEEK_HOURS);

    let last_24h_cutoff = session.timestamp - 24 * 60 * 60 * 1000;
    let recent_24h: Vec<&&HistoryItem> = sorted_history.iter().filter(|h| h.timestamp > last_24h_cutoff).collect();
    let login_velocity = if let Some(first) = recent_24h.first() {
        let span_hours = ((session.timestamp - first.timestamp) as f64 / MS_PER_HOUR).max(0.0);
        if span_hours > 0.0 {
            recent_24h.len() as f64 / span_hours
        } else {
            0.0
        }
    } else {
        0.0
    };

    let last_hour_cutoff = session.timestamp - 60 * 60 * 1000;
    let recent_hour_count = sorted_history.iter().filter(|h| h.timestamp > last_hour_cutoff).count();
    let is_burst = recent_hour_count > 5;

    let recent_hours: Vec<u32> = sorted_history
        .iter()
        .rev()
        .take(CIRCULAR_MEAN_WINDOW)
        .map(|h| to_datetime(h.timestamp).hour())
        .collect();
    let hour_deviation = match circular_mean_hour(&recent_hours) {
        Some(mean_hour) => circular_hour_distance(hour as f64, mean_hour) / 12.0,
        None => 0.5,
    };

    let login_frequency = login_frequency_per_week(&sorted_history);

    [
        hour as f64 / 23.0,
        day_of_week as f64 / 6.0,
        bool_f(is_weekend),
        bool_f(is_business_hours),
        bool_f(is_night),
        hours_since_last_login_capped / WEEK_HOURS,
        (login_velocity / 10.0).min(1.0),
        bool_f(is_burst),
        hour_deviation.min(1.0),
        login_frequency,
    ]
}

fn login_frequency_per_week(sorted_history: &[&HistoryItem]) -> f64 {
    if sorted_history.len() < 2 {
        return 0.0;
    }
    let intervals_days: Vec<f64> = sorted_history
        .windows(2)
        .map(|w| (w[1].timestamp - w[0].timestamp) as f64 / (1000.0 * 60.0 * 60.0 * 24.0))
        .collect();
    let avg_interval = intervals_days.iter().sum::<f64>() / intervals_days.len() as f64;
    let frequency = 7.0 / avg_interval.max(0.1);
    (frequency / 20.0).min(1.0)
}

fn bool_f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
