//! Minimal user-agent parser standing in for a full UA database: browser
//! family/major-version, OS family, and device-class (mobile/tablet/pc/bot)
//! sniffing by substring and version-pattern matching. Grounded on the
//! behavior of `original_source/utils/feature_extractors.py`'s
//! `extract_user_agent_features`, re-expressed without an external UA
//! database since none is available in the retrieved dependency pack.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Windows,
    Mac,
    Linux,
    Android,
    Ios,
    Other,
}

#[derive(Debug, Clone)]
pub struct ParsedUserAgent {
    pub browser: Browser,
    pub browser_major_version: Option<u32>,
    pub os: Os,
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_pc: bool,
    pub is_bot: bool,
    pub bot_keyword_hits: u32,
}

/// Keyword substrings signalling a bot/automation tool, checked
/// case-insensitively. Order matters only for `bot_keyword_hits` (each
/// distinct hit counts once).
const BOT_KEYWORDS: &[&str] = &[
    "bot", "crawler", "spider", "scraper", "curl", "wget", "python", "java",
    "ruby", "perl", "php", "node", "headless", "phantom", "selenium",
    "puppeteer",
];

pub fn parse(ua: &str) -> ParsedUserAgent {
    let lower = ua.to_lowercase();

    let bot_keyword_hits = BOT_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as u32;
    let is_bot = bot_keyword_hits > 0;

    let browser = if lower.contains("edg/") || lower.contains("edge/") {
        Browser::Edge
    } else if lower.contains("chrome/") || lower.contains("crios/") || lower.contains("headlesschrome/") {
        Browser::Chrome
    } else if lower.contains("firefox/") {
        Browser::Firefox
    } else if lower.contains("safari/") && !lower.contains("chrome") {
        Browser::Safari
    } else {
        Browser::Other
    };

    let browser_major_version = extract_major_version(&lower, browser);

    let os = if lower.contains("windows") {
        Os::Windows
    } else if lower.contains("android") {
        Os::Android
    } else if lower.contains("iphone") || lower.contains("ipad") || lower.contains("ios") {
        Os::Ios
    } else if lower.contains("mac os") || lower.contains("macintosh") {
        Os::Mac
    } else if lower.contains("linux") {
        Os::Linux
    } else {
        Os::Other
    };

    let is_tablet = lower.contains("ipad") || (lower.contains("android") && !lower.contains("mobile"));
    let is_mobile = !is_tablet
        && (lower.contains("mobile") || lower.contains("iphone") || lower.contains("android"));
    let is_pc = !is_mobile && !is_tablet && !is_bot;

    ParsedUserAgent {
        browser,
        browser_major_version,
        os,
        is_mobile,
        is_tablet,
        is_pc,
        is_bot,
        bot_keyword_hits,
    }
}

fn extract_major_version(lower: &str, browser: Browser) -> Option<u32> {
    let marker = match browser {
        Browser::Chrome => "chrome/",
        Browser::Firefox => "firefox/",
        Browser::Safari => "version/",
        Browser::Edge => {
            if lower.contains("edg/") {
                "edg/"
            } else {
                "edge/"
            }
        }
        Browser::Other => return None,
    };

    let idx = lower.find(marker)? + marker.len();
    let rest = &lower[idx..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Shannon entropy of the raw string, in bits.
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let mut counts = std::collections::HashMap::new();
    for c in text.chars() {
        *counts.entry(c).or_insert(0u32) += 1;
    }
    let len = text.chars().count() as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}
