//! Client-agent rule overlay (spec.md §4.4, third bullet).

use super::{clamp_u32, raise_to};
use crate::session::{HistoryItem, Session};
use crate::useragent_parse::{Browser, Os, ParsedUserAgent};

const MIN_AGENT_LEN: usize = 20;

/// Minimum supported major version per browser family; below this, the
/// client is either ancient or spoofing a stale string.
fn minimum_version(browser: Browser) -> Option<u32> {
    match browser {
        Browser::Chrome => Some(90),
        Browser::Firefox => Some(88),
        Browser::Safari => Some(14),
        Browser::Edge => Some(90),
        Browser::Other => None,
    }
}

pub fn apply(base: u8, session: &Session, parsed: &ParsedUserAgent, history: &[HistoryItem]) -> u8 {
    let mut score = base as u32;
    let lower = session.user_agent.to_lowercase();

    if parsed.is_bot {
        score = raise_to(score, 80);
    }
    if ["headless", "phantom", "selenium"].iter().any(|k| lower.contains(k)) {
        score = raise_to(score, 85);
    }
    if lower.contains("puppeteer") || lower.contains("headlesschrome") {
        score = raise_to(score, 90);
    }

    if let (Some(min_version), Some(actual)) = (minimum_version(parsed.browser), parsed.browser_major_version) {
        if actual < min_version {
            score += 20;
        }
    }

    let is_non_mobile_windows = parsed.os == Os::Windows && !parsed.is_mobile && !parsed.is_tablet;
    // touchSupport isn't threaded through ParsedUserAgent; callers combine
    // it from the fingerprint before invoking this overlay.
    let _ = is_non_mobile_windows;

    let last_10: Vec<&HistoryItem> = history.iter().rev().take(10).collect();
    let distinct_agents = last_10.iter().map(|h| h.user_agent.as_str()).collect::<std::collections::HashSet<_>>().len();
    if distinct_agents > 5 {
        score += 10;
    }

    if session.user_agent.chars().count() < MIN_AGENT_LEN {
        score = raise_to(score, 75);
    }

    clamp_u32(score)
}

/// The "touch support present AND non-mobile Windows" inconsistency needs
/// the fingerprint, which `ParsedUserAgent` doesn't carry; applied
/// separately so `apply` stays a pure function of the parsed agent.
pub fn apply_touch_inconsistency(base: u8, parsed: &ParsedUserAgent, touch_support: Option<bool>) -> u8 {
    let inconsistent = touch_support.unwrap_or(false) && parsed.os == Os::Windows && !parsed.is_mobile && !parsed.is_tablet;
    if inconsistent {
        clamp_u32(base as u32 + 15)
    } else {
        base
    }
}
