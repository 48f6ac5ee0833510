//! HTTP handlers (the wire boundary, spec.md §6). Request/response shapes
//! live in `schema`; this module only wires them to the pipeline and the
//! C7 adapters, in the teacher's handler style: `HttpRequest` +
//! `web::Data` + `web::Json` in, `HttpResponse::...().json(...)` out.

use crate::adapters::{AuditRecord, AuditSink, GeoLookup, InProcessCache, RateLimiter, ResultCache};
use crate::config::Config;
use crate::detector::Detectors;
use crate::error::EngineError;
use crate::pipeline;
use crate::schema::{AnalyzeRequest, AnalyzeResponse, FeedbackRequest, FeedbackResponse, HealthResponse, HealthStatus};
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub detectors: Arc<Detectors>,
    pub geo_lookup: Arc<dyn GeoLookup>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub result_cache: Arc<InProcessCache>,
    pub audit: Arc<dyn AuditSink>,
    pub models_loaded: bool,
}

fn is_authorized(req: &HttpRequest, state: &AppState) -> bool {
    if !state.config.require_api_key {
        return true;
    }
    match req.headers().get("X-API-Key") {
        Some(key) => key.to_str().map(|k| k == state.config.api_key).unwrap_or(false),
        None => false,
    }
}

fn client_address(req: &HttpRequest) -> String {
    req.connection_info().realip_remote_addr().unwrap_or("unknown").to_string()
}

pub async fn analyze(req: HttpRequest, state: web::Data<AppState>, body: web::Json<AnalyzeRequest>) -> Result<HttpResponse, EngineError> {
    if !is_authorized(&req, &state) {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"error": "invalid or missing X-API-Key"})));
    }

    let client_addr = client_address(&req);
    let rate_limit_key = format!("{}:{}", state.config.api_key, client_addr);
    let within_budget = state
        .rate_limiter
        .check_and_increment(&rate_limit_key, state.config.rate_limit_window_secs, state.config.rate_limit_requests)
        .await;
    if !within_budget {
        return Err(EngineError::RateLimited);
    }

    let request = body.into_inner();
    let cache_key = InProcessCache::key(&request.user_id, &request.current_session.ip, &request.current_session.user_agent);
    let request_id = pipeline::new_request_id();

    if let Some(cached) = state.result_cache.get(&cache_key).await {
        let response = AnalyzeResponse {
            meta: crate::schema::ResponseMeta {
                request_id,
                user_id: request.user_id,
                timestamp: chrono::Utc::now().timestamp_millis(),
                processing_time: 0,
                models_version: state.config.bundle_version.clone(),
                cache_hit: true,
            },
            scores: cached,
        };
        return Ok(HttpResponse::Ok().json(response));
    }

    let response = pipeline::run(request, state.detectors.clone(), state.geo_lookup.clone(), &state.config, &request_id).await?;

    state.result_cache.set(&cache_key, response.scores.clone(), state.config.result_cache_ttl_secs).await;

    let audit = state.audit.clone();
    let record = AuditRecord::Analyze {
        request_id: response.meta.request_id.clone(),
        user_id: response.meta.user_id.clone(),
        ip: client_addr,
        scores: response.scores.clone(),
        processing_time_ms: response.meta.processing_time,
    };
    // Fire-and-forget: the audit write must not add to response latency,
    // and its failure must not fail the request (spec.md §4.7, §7).
    actix_web::rt::spawn(async move {
        audit.write(record).await;
    });

    Ok(HttpResponse::Ok().json(response))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let status = if state.models_loaded { HealthStatus::Healthy } else { HealthStatus::Degraded };
    HttpResponse::Ok().json(HealthResponse {
        status,
        timestamp: chrono::Utc::now().timestamp_millis(),
        version: state.config.bundle_version.clone(),
        models_loaded: state.models_loaded,
        cache_connected: true,
        audit_connected: true,
    })
}

pub async fn feedback(req: HttpRequest, state: web::Data<AppState>, body: web::Json<FeedbackRequest>) -> Result<HttpResponse, EngineError> {
    if !is_authorized(&req, &state) {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"error": "invalid or missing X-API-Key"})));
    }

    info!("received feedback for request {}: was_legitimate={}", body.request_id, body.was_legitimate);

    let body = body.into_inner();
    let message = format!("feedback recorded for request {}", body.request_id);
    state
        .audit
        .write(AuditRecord::Feedback { request_id: body.request_id, was_legitimate: body.was_legitimate, notes: body.notes })
        .await;

    Ok(HttpResponse::Ok().json(FeedbackResponse { success: true, message }))
}
