//! Request-scoped, immutable engine-internal types and the validate/
//! sanitize steps of the scoring pipeline (spec.md §4.6 steps 1–2).

use crate::error::EngineError;
use crate::schema::{AnalyzeRequest, CurrentSessionDto, LocationDto, LoginHistoryItemDto, LoginStatus};

const MIN_TIMESTAMP_MS: i64 = 1_577_836_800_000; // 2020-01-01T00:00:00Z
const MAX_TIMESTAMP_MS: i64 = 1_893_456_000_000; // 2030-01-01T00:00:00Z
const MAX_HISTORY_LEN: usize = 1000;
const MAX_AGENT_LEN: usize = 1000;

#[derive(Debug, Clone)]
pub struct Location {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn unknown() -> Self {
        Self { country: "unknown".to_string(), city: "unknown".to_string(), latitude: 0.0, longitude: 0.0 }
    }
}

impl From<LocationDto> for Location {
    fn from(dto: LocationDto) -> Self {
        Self {
            country: sanitize_string(&dto.country, usize::MAX),
            city: sanitize_string(&dto.city, usize::MAX),
            latitude: dto.latitude,
            longitude: dto.longitude,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Fingerprint {
    pub screen_resolution: Option<String>,
    pub timezone: Option<String>,
    pub platform: Option<String>,
    pub webgl_renderer: Option<String>,
    pub fonts: Vec<String>,
    pub plugins: Vec<String>,
    pub canvas_fingerprint: Option<String>,
    pub audio_fingerprint: Option<String>,
    pub touch_support: Option<bool>,
    pub device_memory_gb: Option<i64>,
    pub hardware_concurrency: Option<i64>,
    pub is_cookie_enabled: Option<bool>,
}

/// The validated, sanitized current session. Geolocation is attached (or
/// left as `Location::unknown()`) by the pipeline's enrichment step,
/// never by the caller.
#[derive(Debug, Clone)]
pub struct Session {
    pub ip: String,
    pub user_agent: String,
    pub timestamp: i64,
    pub location: Option<Location>,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub ip: String,
    pub user_agent: String,
    pub timestamp: i64,
    pub location: Location,
    pub status: LoginOutcome,
}

/// Strip ASCII control bytes (everything below 0x20 plus DEL) and, if
/// `max_len` is finite, truncate to that many characters.
fn sanitize_string(input: &str, max_len: usize) -> String {
    let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
    if cleaned.chars().count() > max_len {
        cleaned.chars().take(max_len).collect()
    } else {
        cleaned
    }
}

fn is_syntactically_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else { return false };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(|c| c.is_whitespace())
        && s.matches('@').count() == 1
}

pub fn validate_timestamp(ts: i64) -> bool {
    (MIN_TIMESTAMP_MS..=MAX_TIMESTAMP_MS).contains(&ts)
}

/// Step 1 of the pipeline: validate the request shape, independent of
/// sanitization. Returns the first validation failure found.
pub fn validate_request(req: &AnalyzeRequest) -> Result<(), EngineError> {
    if req.current_session.ip.parse::<std::net::IpAddr>().is_err() {
        return Err(EngineError::validation("currentSession.ip", "does not parse as IPv4 or IPv6"));
    }
    if !validate_timestamp(req.current_session.timestamp) {
        return Err(EngineError::validation(
            "currentSession.timestamp",
            "must be between 2020-01-01 and 2030-01-01 (ms epoch)",
        ));
    }
    if req.login_history.len() > MAX_HISTORY_LEN {
        return Err(EngineError::validation("loginHistory", "cannot exceed 1000 items"));
    }
    if !is_syntactically_email(&req.user_id) {
        return Err(EngineError::validation("userId", "must be a syntactically valid email"));
    }
    Ok(())
}

/// Step 2: sanitize and lower the validated DTO into the internal,
/// immutable engine `Session` (geolocation not yet attached).
pub fn sanitize_session(dto: CurrentSessionDto) -> Session {
    Session {
        ip: dto.ip.trim().to_string(),
        user_agent: sanitize_string(&dto.user_agent, MAX_AGENT_LEN),
        timestamp: dto.timestamp,
        location: None,
        fingerprint: Fingerprint {
            screen_resolution: dto.screen_resolution.map(|s| sanitize_string(&s, usize::MAX)),
            timezone: dto.timezone.map(|s| sanitize_string(&s, usize::MAX)),
            platform: dto.platform.map(|s| sanitize_string(&s, usize::MAX)),
            webgl_renderer: dto.webgl_renderer.map(|s| sanitize_string(&s, usize::MAX)),
            fonts: dto.fonts,
            plugins: dto.plugins,
            canvas_fingerprint: dto.canvas_fingerprint,
            audio_fingerprint: dto.audio_fingerprint,
            touch_support: dto.touch_support,
            device_memory_gb: dto.device_memory,
            hardware_concurrency: dto.hardware_concurrency,
            is_cookie_enabled: dto.is_cookie_enabled,
        },
    }
}

pub fn sanitize_history(dto: LoginHistoryItemDto) -> HistoryItem {
    HistoryItem {
        ip: dto.ip.trim().to_string(),
        user_agent: sanitize_string(&dto.user_agent, MAX_AGENT_LEN),
        timestamp: dto.timestamp,
        location: dto.location.into(),
        status: match dto.login_status {
            LoginStatus::Success => LoginOutcome::Success,
            LoginStatus::Failure => LoginOutcome::Failure,
        },
    }
}
