//! Scoring pipeline (C6): the six-step path from wire request to wire
//! response (spec.md §4.6). Validate -> sanitize -> enrich -> fan out the
//! four detectors under a deadline -> fuse -> attach meta.

use crate::adapters::GeoLookup;
use crate::config::{Config, FusionWeights};
use crate::detector::Detectors;
use crate::error::EngineError;
use crate::schema::{AnalyzeRequest, AnalyzeResponse, ResponseMeta, RiskScoresDto};
use crate::session::{self, HistoryItem, Location, Session};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

const NEUTRAL_SCORE: u8 = 50;

pub fn new_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

fn fuse(scores: (u8, u8, u8, u8), weights: &FusionWeights) -> u8 {
    let (ip, datetime, user_agent, geolocation) = scores;
    let weighted = weights.ip * ip as f64
        + weights.datetime * datetime as f64
        + weights.user_agent * user_agent as f64
        + weights.geolocation * geolocation as f64;
    weighted.round().clamp(0.0, 100.0) as u8
}

async fn enrich_location(geo_lookup: &Arc<dyn GeoLookup>, ip: &str, timeout_ms: u64) -> Location {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), geo_lookup.lookup(ip)).await {
        Ok(Some(location)) => location,
        Ok(None) | Err(_) => Location::unknown(),
    }
}

/// Run one of the four CPU-bound detectors on a worker thread, under a
/// slice deadline; exceeding it yields the neutral score without blocking
/// the response past the request deadline (spec.md §5, §8).
async fn run_detector<F>(detectors: Arc<Detectors>, session: Session, history: Vec<HistoryItem>, deadline: Duration, detector_fn: F) -> u8
where
    F: FnOnce(&Detectors, &Session, &[HistoryItem]) -> u8 + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(move || detector_fn(&detectors, &session, &history));
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(score)) => score,
        Ok(Err(_)) | Err(_) => NEUTRAL_SCORE,
    }
}

pub async fn run(
    request: AnalyzeRequest,
    detectors: Arc<Detectors>,
    geo_lookup: Arc<dyn GeoLookup>,
    config: &Config,
    request_id: &str,
) -> Result<AnalyzeResponse, EngineError> {
    let start = Instant::now();

    // Step 1: validate.
    session::validate_request(&request)?;

    // Step 2: sanitize.
    let mut current = session::sanitize_session(request.current_session);
    let history: Vec<HistoryItem> = request.login_history.into_iter().map(session::sanitize_history).collect();
    let user_id = request.user_id;

    // Step 3: enrich.
    current.location = Some(enrich_location(&geo_lookup, &current.ip, config.geolocation_timeout_ms).await);

    // Step 4: dispatch the four detectors concurrently under the
    // per-request deadline.
    let deadline = Duration::from_millis(config.request_timeout_ms);
    let (ip_score, datetime_score, user_agent_score, geolocation_score) = tokio::join!(
        run_detector(detectors.clone(), current.clone(), history.clone(), deadline, |d, s, h| d.network.score(s, h)),
        run_detector(detectors.clone(), current.clone(), history.clone(), deadline, |d, s, h| d.temporal.score(s, h)),
        run_detector(detectors.clone(), current.clone(), history.clone(), deadline, |d, s, h| d.useragent.score(s, h)),
        run_detector(detectors.clone(), current.clone(), history.clone(), deadline, |d, s, h| d.geo.score(s, h)),
    );

    // Step 5: fuse.
    let overall = fuse((ip_score, datetime_score, user_agent_score, geolocation_score), &config.fusion_weights);
    let scores = RiskScoresDto { ip: ip_score, datetime: datetime_score, user_agent: user_agent_score, geolocation: geolocation_score, overall };

    // Step 6: attach meta.
    let meta = ResponseMeta {
        request_id: request_id.to_string(),
        user_id,
        timestamp: chrono::Utc::now().timestamp_millis(),
        processing_time: start.elapsed().as_millis() as u64,
        models_version: config.bundle_version.clone(),
        cache_hit: false,
    };

    Ok(AnalyzeResponse { meta, scores })
}
