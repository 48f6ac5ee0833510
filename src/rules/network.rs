//! Network rule overlay (spec.md §4.4, first bullet).

use super::{clamp_u32, raise_to};
use crate::ipaddr_ext::ParsedIp;
use crate::session::{HistoryItem, Session};
use std::collections::HashSet;

const LAST_HOUR_MS: i64 = 60 * 60 * 1000;

/// `known_bad` is an operator-maintained set of addresses flagged by threat
/// feeds; empty by default (the engine ships no such list — see DESIGN.md).
pub fn apply(base: u8, session: &Session, parsed: &ParsedIp, history: &[HistoryItem], known_bad: &HashSet<String>) -> u8 {
    let mut score = base as u32;

    if known_bad.contains(&session.ip) {
        score = raise_to(score + 30, 90);
    }
    if parsed.is_datacenter {
        score += 20;
    }
    if parsed.is_tor {
        score += 30;
    }

    let cutoff = session.timestamp - LAST_HOUR_MS;
    let distinct_last_hour = history
        .iter()
        .filter(|h| h.timestamp > cutoff)
        .map(|h| h.ip.as_str())
        .collect::<HashSet<_>>()
        .len();
    if distinct_last_hour > 3 {
        score += 20;
    }

    if parsed.is_private {
        score += 10;
    }

    clamp_u32(score)
}
