//! Temporal rule overlay (spec.md §4.4, second bullet).

use super::clamp_u32;
use crate::session::{HistoryItem, LoginOutcome, Session};
use chrono::{DateTime, Timelike, Utc};

const FIVE_MIN_MS: i64 = 5 * 60 * 1000;
const EQUAL_CADENCE_WINDOW: usize = 6;

fn to_hour(ts_ms: i64) -> u32 {
    DateTime::from_timestamp_millis(ts_ms).unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap()).hour()
}

/// True if the last `EQUAL_CADENCE_WINDOW` login intervals (including the
/// current session as the newest point) are all identical — regular,
/// machine-paced cadence rather than human variance.
fn has_bot_cadence(session: &Session, sorted_history: &[&HistoryItem]) -> bool {
    let mut timestamps: Vec<i64> = sorted_history.iter().map(|h| h.timestamp).collect();
    timestamps.push(session.timestamp);
    if timestamps.len() < EQUAL_CADENCE_WINDOW + 1 {
        return false;
    }
    let tail = &timestamps[timestamps.len() - (EQUAL_CADENCE_WINDOW + 1)..];
    let intervals: Vec<i64> = tail.windows(2).map(|w| w[1] - w[0]).collect();
    intervals.windows(2).all(|w| w[0] == w[1])
}

pub fn apply(base: u8, session: &Session, history: &[HistoryItem]) -> u8 {
    let mut score = base as u32;

    let hour = to_hour(session.timestamp);
    if (2..=5).contains(&hour) {
        score += 20;
    }

    let mut sorted_history: Vec<&HistoryItem> = history.iter().collect();
    sorted_history.sort_by_key(|h| h.timestamp);

    let five_min_cutoff = session.timestamp - FIVE_MIN_MS;
    let recent_5min = sorted_history.iter().filter(|h| h.timestamp > five_min_cutoff).count();
    if recent_5min > 5 {
        score += 30;
    } else if (3..=5).contains(&recent_5min) {
        score += 15;
    }

    let last_10: Vec<&&HistoryItem> = sorted_history.iter().rev().take(10).collect();
    let failures = last_10.iter().filter(|h| h.status == LoginOutcome::Failure).count();
    if failures > 3 {
        score += 20;
    }

    if has_bot_cadence(session, &sorted_history) {
        score += 25;
    }

    clamp_u32(score)
}
