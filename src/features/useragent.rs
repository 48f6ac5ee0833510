//! Client-agent factor, 23 features (spec.md §4.1 "≈18–25").
//!
//! Unknown/absent fields map to 0.5 for presence-unknown (e.g. a missing
//! version number or hardware-concurrency reading), 0 for boolean-unknown
//! (e.g. an absent touch-support or cookie flag), per spec.md §4.1.

use crate::session::Session;
use crate::useragent_parse::{self, Browser, Os};

pub const LEN: usize = 23;
const PRESENCE_UNKNOWN: f64 = 0.5;

pub fn extract(session: &Session) -> [f64; LEN] {
    let ua = &session.user_agent;
    let parsed = useragent_parse::parse(ua);
    let entropy = useragent_parse::shannon_entropy(ua);
    let len = ua.chars().count();

    let major_version_scaled = match parsed.browser_major_version {
        Some(v) => (v as f64 / 150.0).min(1.0),
        None => PRESENCE_UNKNOWN,
    };

    let special_char_ratio = if len == 0 {
        0.0
    } else {
        ua.chars().filter(|c| !c.is_alphanumeric()).count() as f64 / len as f64
    };

    let fp = &session.fingerprint;

    [
        (len as f64 / 500.0).min(1.0),
        bool_f(parsed.is_bot),
        bool_f(parsed.is_mobile),
        bool_f(parsed.is_tablet),
        bool_f(parsed.is_pc),
        bool_f(parsed.browser == Browser::Chrome),
        bool_f(parsed.browser == Browser::Firefox),
        bool_f(parsed.browser == Browser::Safari),
        bool_f(parsed.browser == Browser::Edge),
        bool_f(parsed.os == Os::Windows),
        bool_f(parsed.os == Os::Mac),
        bool_f(parsed.os == Os::Linux),
        bool_f(parsed.os == Os::Android),
        bool_f(parsed.os == Os::Ios),
        major_version_scaled,
        (parsed.bot_keyword_hits as f64 / 5.0).min(1.0),
        (entropy / 5.0).min(1.0),
        bool_f(fp.canvas_fingerprint.is_some()),
        (fp.plugins.len() as f64 / 20.0).min(1.0),
        bool_f(fp.is_cookie_enabled.unwrap_or(false)),
        bool_f(fp.touch_support.unwrap_or(false)),
        fp.hardware_concurrency.map(|c| (c as f64 / 32.0).min(1.0)).unwrap_or(PRESENCE_UNKNOWN),
        special_char_ratio,
    ]
}

fn bool_f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
