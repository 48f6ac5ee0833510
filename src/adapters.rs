//! Cache & audit adapters (C7) — the three small collaborator interfaces
//! the engine depends on: geolocation lookup, key-value cache (rate-limit
//! counter + result cache), and audit sink. Each is independently
//! mockable (spec.md §9) and each failure mode is recovered silently by
//! the pipeline, never surfaced to the caller (spec.md §7).

use crate::schema::RiskScoresDto;
use crate::session::Location;
use async_trait::async_trait;
use dashmap::DashMap;
use log::warn;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Resolve an address to a location. `None` on miss or lookup failure;
    /// the pipeline applies its own 100 ms timeout around this call.
    async fn lookup(&self, ip: &str) -> Option<Location>;
}

/// No external geolocation provider is wired up; every lookup misses and
/// the pipeline falls back to `Location::unknown()`, exactly as it would
/// for a provider outage.
pub struct StaticGeoLookup;

#[async_trait]
impl GeoLookup for StaticGeoLookup {
    async fn lookup(&self, _ip: &str) -> Option<Location> {
        None
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Increment the counter for `key` and report whether the request is
    /// still within budget. Store failures must not fail the request —
    /// implementations fall back to local accounting.
    async fn check_and_increment(&self, key: &str, window_secs: u64, limit: u32) -> bool;
}

/// Increment-and-expire counter keyed by (api-key, client-address),
/// window 60s by default. Matches the teacher's `DashMap`-for-concurrency
/// pattern (`main.rs`'s `AppState.baselines`) rather than a global mutex.
pub struct InProcessRateLimiter {
    counters: DashMap<String, (u32, i64)>,
}

impl InProcessRateLimiter {
    pub fn new() -> Self {
        Self { counters: DashMap::new() }
    }

    fn now_secs() -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
    }
}

impl Default for InProcessRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimiter for InProcessRateLimiter {
    async fn check_and_increment(&self, key: &str, window_secs: u64, limit: u32) -> bool {
        let now = Self::now_secs();
        let mut entry = self.counters.entry(key.to_string()).or_insert((0, now));
        if now - entry.1 >= window_secs as i64 {
            entry.0 = 0;
            entry.1 = now;
        }
        entry.0 += 1;
        entry.0 <= limit
    }
}

#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<RiskScoresDto>;
    async fn set(&self, key: &str, value: RiskScoresDto, ttl_secs: u64);
}

/// Result cache: key = (userId, current-address, first 50 chars of agent
/// string); write on successful computation only (spec.md §4.7).
pub struct InProcessCache {
    entries: DashMap<String, (RiskScoresDto, Instant, u64)>,
}

impl InProcessCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn key(user_id: &str, ip: &str, user_agent: &str) -> String {
        let agent_prefix: String = user_agent.chars().take(50).collect();
        format!("{user_id}:{ip}:{agent_prefix}")
    }
}

impl Default for InProcessCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for InProcessCache {
    async fn get(&self, key: &str) -> Option<RiskScoresDto> {
        let entry = self.entries.get(key)?;
        let (value, stored_at, ttl_secs) = entry.value();
        if stored_at.elapsed().as_secs() > *ttl_secs {
            None
        } else {
            Some(value.clone())
        }
    }

    async fn set(&self, key: &str, value: RiskScoresDto, ttl_secs: u64) {
        self.entries.insert(key.to_string(), (value, Instant::now(), ttl_secs));
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "kind")]
pub enum AuditRecord {
    /// A completed `/v1/analyze` scoring, recorded for later review.
    Analyze { request_id: String, user_id: String, ip: String, scores: RiskScoresDto, processing_time_ms: u64 },
    /// A `/v1/feedback` report that a prior scoring was (or wasn't)
    /// legitimate, forwarded as its own record rather than consumed for
    /// scoring (spec.md §9 — no in-request retraining).
    Feedback { request_id: String, was_legitimate: bool, notes: String },
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Fire-and-forget write; failure to audit must not fail the request
    /// (spec.md §4.7, §7).
    async fn write(&self, record: AuditRecord);
}

/// Default audit sink: logs the record at info level rather than writing
/// to a document store, since no document-store crate is part of the
/// retrieved dependency pack (see DESIGN.md).
pub struct LoggingAudit;

#[async_trait]
impl AuditSink for LoggingAudit {
    async fn write(&self, record: AuditRecord) {
        match serde_json::to_string(&record) {
            Ok(line) => log::info!("audit {line}"),
            Err(e) => warn!("audit record not serializable: {e}"),
        }
    }
}
