//! Integration test driving the full scoring pipeline against the six
//! literal end-to-end scenarios of spec.md §8 (S1-S6), plus one HTTP-layer
//! test confirming the error-kind -> status-code mapping of spec.md §7.
//! Scenario names below describe the behavior under test, not the spec's
//! internal scenario labels.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeZone;

use login_risk_scoring::adapters::{
    GeoLookup, InProcessCache, InProcessRateLimiter, LoggingAudit, StaticGeoLookup,
};
use login_risk_scoring::api::{self, AppState};
use login_risk_scoring::bundle::{
    Activation, DenseLayer, IsolationNode, IsolationTree, ModelBundle, ModelParams, Normalizer,
};
use login_risk_scoring::config::Config;
use login_risk_scoring::detector::{Detectors, GeoDetector, NetworkDetector, TemporalDetector, UserAgentDetector};
use login_risk_scoring::features;
use login_risk_scoring::pipeline;
use login_risk_scoring::schema::{AnalyzeRequest, CurrentSessionDto, LocationDto, LoginHistoryItemDto, LoginStatus};
use login_risk_scoring::session::{Fingerprint, HistoryItem, Location, LoginOutcome, Session};

fn current_session_dto(ip: &str, ua: &str, ts: i64) -> CurrentSessionDto {
    CurrentSessionDto {
        ip: ip.to_string(),
        user_agent: ua.to_string(),
        timestamp: ts,
        accept_language: None,
        screen_resolution: None,
        timezone: None,
        platform: None,
        webgl_renderer: None,
        fonts: vec![],
        canvas_fingerprint: None,
        audio_fingerprint: None,
        plugins: vec![],
        touch_support: None,
        device_memory: None,
        hardware_concurrency: None,
        referrer: None,
        is_cookie_enabled: None,
        is_java_enabled: None,
        browser_version: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn history_dto(ip: &str, ua: &str, ts: i64, country: &str, city: &str, lat: f64, lon: f64, status: LoginStatus) -> LoginHistoryItemDto {
    LoginHistoryItemDto {
        ip: ip.to_string(),
        user_agent: ua.to_string(),
        timestamp: ts,
        location: LocationDto { country: country.to_string(), city: city.to_string(), latitude: lat, longitude: lon },
        login_status: status,
    }
}

fn engine_session(ip: &str, ua: &str, ts: i64) -> Session {
    Session { ip: ip.to_string(), user_agent: ua.to_string(), timestamp: ts, location: None, fingerprint: Fingerprint::default() }
}

#[allow(clippy::too_many_arguments)]
fn engine_history(ip: &str, ua: &str, ts: i64, country: &str, city: &str, lat: f64, lon: f64, status: LoginOutcome) -> HistoryItem {
    HistoryItem {
        ip: ip.to_string(),
        user_agent: ua.to_string(),
        timestamp: ts,
        location: Location { country: country.to_string(), city: city.to_string(), latitude: lat, longitude: lon },
        status,
    }
}

fn analyze_request(session: CurrentSessionDto, history: Vec<LoginHistoryItemDto>, user_id: &str) -> AnalyzeRequest {
    AnalyzeRequest { current_session: session, login_history: history, user_id: user_id.to_string() }
}

struct FixedGeoLookup(Location);

#[async_trait]
impl GeoLookup for FixedGeoLookup {
    async fn lookup(&self, _ip: &str) -> Option<Location> {
        Some(self.0.clone())
    }
}

fn rules_only_detectors() -> Detectors {
    Detectors {
        network: NetworkDetector::new(None, HashSet::new()),
        temporal: TemporalDetector::new(None),
        useragent: UserAgentDetector::new(None),
        geo: GeoDetector::new(None, 900.0),
    }
}

fn identity_matrix(n: usize) -> Vec<Vec<f64>> {
    (0..n).map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect()).collect()
}

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

/// Build a detector bundle for each factor that recognizes a specific
/// (session, history) pair as a deep inlier: a loaded-model stand-in for a
/// well-trained detector, used only for the "normal residential login"
/// scenario where spec.md requires every factor near zero risk — something
/// the neutral rules-only base (50) cannot express on its own.
fn trained_low_risk_detectors(session: &Session, history: &[HistoryItem]) -> Detectors {
    let network_vector = features::network::extract(session, history);

    let network_bundle = ModelBundle {
        algorithm: "one_class_svm".to_string(),
        version: "v1.0.0".to_string(),
        feature_count: features::network::LEN,
        normalizer: Normalizer::identity(features::network::LEN),
        params: ModelParams::OneClassSvm {
            support_vectors: vec![network_vector.to_vec()],
            dual_coef: vec![1.0],
            gamma: 1.0,
            rho: -50.0,
        },
        threshold: None,
    };

    let temporal_bundle = ModelBundle {
        algorithm: "isolation_forest".to_string(),
        version: "v1.0.0".to_string(),
        feature_count: features::temporal::LEN,
        normalizer: Normalizer::identity(features::temporal::LEN),
        params: ModelParams::IsolationForest {
            trees: vec![IsolationTree { nodes: vec![IsolationNode::Leaf { depth: 20 }] }],
            avg_path_length_normal: 5.0,
        },
        threshold: None,
    };

    let useragent_bundle = ModelBundle {
        algorithm: "autoencoder".to_string(),
        version: "v1.0.0".to_string(),
        feature_count: features::useragent::LEN,
        normalizer: Normalizer::identity(features::useragent::LEN),
        params: ModelParams::Autoencoder {
            layers: vec![DenseLayer { weights: identity_matrix(features::useragent::LEN), biases: vec![0.0; features::useragent::LEN], activation: Activation::Relu }],
        },
        threshold: Some(1.0),
    };

    let (_, geo_vector) = features::geo::extract(session, history, 900.0);

    let geo_bundle = ModelBundle {
        algorithm: "dbscan".to_string(),
        version: "v1.0.0".to_string(),
        feature_count: features::geo::LEN,
        normalizer: Normalizer::identity(features::geo::LEN),
        params: ModelParams::Dbscan { core_samples: vec![geo_vector.to_vec()] },
        threshold: None,
    };

    Detectors {
        network: NetworkDetector::new(Some(network_bundle), HashSet::new()),
        temporal: TemporalDetector::new(Some(temporal_bundle)),
        useragent: UserAgentDetector::new(Some(useragent_bundle)),
        geo: GeoDetector::new(Some(geo_bundle), 900.0),
    }
}

#[tokio::test]
async fn normal_residential_login_scores_low_across_every_factor() {
    let base_ts = chrono::Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap().timestamp_millis();
    let ip = "73.45.123.45";
    let (country, city, lat, lon) = ("United States", "Seattle", 47.6062, -122.3321);

    let mut history_engine = Vec::new();
    let mut history_dtos = Vec::new();
    for i in 1..=10i64 {
        let ts = base_ts - i * 86_400_000 - i * 37_000;
        history_engine.push(engine_history(ip, DESKTOP_UA, ts, country, city, lat, lon, LoginOutcome::Success));
        history_dtos.push(history_dto(ip, DESKTOP_UA, ts, country, city, lat, lon, LoginStatus::Success));
    }

    let session = engine_session(ip, DESKTOP_UA, base_ts);
    let detectors = Arc::new(trained_low_risk_detectors(&session, &history_engine));
    let geo_lookup: Arc<dyn GeoLookup> = Arc::new(FixedGeoLookup(Location { country: country.to_string(), city: city.to_string(), latitude: lat, longitude: lon }));

    let request = analyze_request(current_session_dto(ip, DESKTOP_UA, base_ts), history_dtos, "user@example.com");
    let config = Config::default();
    let response = pipeline::run(request, detectors, geo_lookup, &config, "req_test1").await.unwrap();

    assert!(response.scores.ip <= 30, "ip={}", response.scores.ip);
    assert!(response.scores.datetime <= 30, "datetime={}", response.scores.datetime);
    assert!(response.scores.user_agent <= 30, "userAgent={}", response.scores.user_agent);
    assert!(response.scores.geolocation <= 30, "geolocation={}", response.scores.geolocation);
    assert!(response.scores.overall <= 30, "overall={}", response.scores.overall);
}

#[tokio::test]
async fn datacenter_address_with_no_history_raises_ip_risk() {
    let ts = chrono::Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap().timestamp_millis();
    let request = analyze_request(current_session_dto("104.16.1.1", DESKTOP_UA, ts), vec![], "user@example.com");

    let detectors = Arc::new(rules_only_detectors());
    let geo_lookup: Arc<dyn GeoLookup> = Arc::new(StaticGeoLookup);
    let config = Config::default();
    let response = pipeline::run(request, detectors, geo_lookup, &config, "req_test2").await.unwrap();

    assert!(response.scores.ip >= 70, "ip={}", response.scores.ip);
    assert!(response.scores.overall >= 40, "overall={}", response.scores.overall);
}

#[tokio::test]
async fn headless_chrome_agent_floors_useragent_risk() {
    let ts = chrono::Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap().timestamp_millis();
    let ua = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) HeadlessChrome/120.0.0.0 Safari/537.36";
    let request = analyze_request(current_session_dto("73.45.123.45", ua, ts), vec![], "user@example.com");

    let detectors = Arc::new(rules_only_detectors());
    let geo_lookup: Arc<dyn GeoLookup> = Arc::new(StaticGeoLookup);
    let config = Config::default();
    let response = pipeline::run(request, detectors, geo_lookup, &config, "req_test3").await.unwrap();

    assert!(response.scores.user_agent >= 85, "userAgent={}", response.scores.user_agent);
    assert!(response.scores.overall >= 50, "overall={}", response.scores.overall);
}

#[tokio::test]
async fn night_login_raises_temporal_risk() {
    let night_ts = chrono::Utc.with_ymd_and_hms(2024, 6, 25, 3, 15, 0).unwrap().timestamp_millis();
    let ip = "73.45.123.45";

    let mut history_dtos = Vec::new();
    for i in 1..=10i64 {
        let day = 24 - i as u32;
        let day_ts = chrono::Utc.with_ymd_and_hms(2024, 6, day, 13, 0, 0).unwrap().timestamp_millis() + i * 11 * 60_000;
        history_dtos.push(history_dto(ip, DESKTOP_UA, day_ts, "United States", "Seattle", 47.6062, -122.3321, LoginStatus::Success));
    }

    let request = analyze_request(current_session_dto(ip, DESKTOP_UA, night_ts), history_dtos, "user@example.com");
    let detectors = Arc::new(rules_only_detectors());
    let geo_lookup: Arc<dyn GeoLookup> = Arc::new(StaticGeoLookup);
    let config = Config::default();
    let response = pipeline::run(request, detectors, geo_lookup, &config, "req_test4").await.unwrap();

    assert!(response.scores.datetime >= 70, "datetime={}", response.scores.datetime);
    assert!(response.scores.overall >= 40, "overall={}", response.scores.overall);
}

#[tokio::test]
async fn impossible_travel_floors_geolocation_risk_by_speed() {
    let last_login_ts = chrono::Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap().timestamp_millis();
    let current_ts = last_login_ts + 42 * 60 * 1000;

    let history = vec![history_dto("5.6.7.8", DESKTOP_UA, last_login_ts, "United States", "New York", 40.7128, -74.0060, LoginStatus::Success)];
    let request = analyze_request(current_session_dto("1.2.3.4", DESKTOP_UA, current_ts), history, "user@example.com");

    let detectors = Arc::new(rules_only_detectors());
    let geo_lookup: Arc<dyn GeoLookup> = Arc::new(FixedGeoLookup(Location { country: "United Kingdom".to_string(), city: "London".to_string(), latitude: 51.5074, longitude: -0.1278 }));
    let config = Config::default();
    let response = pipeline::run(request, detectors, geo_lookup, &config, "req_test5").await.unwrap();

    // ~5570 km in 42 minutes implies well over 2000 km/h: the 95 floor applies.
    assert!(response.scores.geolocation >= 95, "geolocation={}", response.scores.geolocation);
}

#[tokio::test]
async fn brute_force_burst_raises_temporal_risk() {
    let now = chrono::Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap().timestamp_millis();
    let ip = "73.45.123.45";

    let mut history = Vec::new();
    for i in 1..=10i64 {
        let ts = now - i * 25_000;
        let status = if i <= 8 { LoginStatus::Failure } else { LoginStatus::Success };
        history.push(history_dto(ip, DESKTOP_UA, ts, "United States", "Seattle", 47.6062, -122.3321, status));
    }

    let request = analyze_request(current_session_dto(ip, DESKTOP_UA, now), history, "user@example.com");
    let detectors = Arc::new(rules_only_detectors());
    let geo_lookup: Arc<dyn GeoLookup> = Arc::new(StaticGeoLookup);
    let config = Config::default();
    let response = pipeline::run(request, detectors, geo_lookup, &config, "req_test6").await.unwrap();

    assert!(response.scores.datetime >= 50, "datetime={}", response.scores.datetime);
    assert!(response.scores.overall >= 40, "overall={}", response.scores.overall);
}

#[tokio::test]
async fn four_detectors_dispatched_in_parallel_match_scores_from_identical_inputs() {
    // Order independence (spec.md §8): running the pipeline twice against
    // byte-identical input must produce byte-identical scores, regardless
    // of which detector task happens to finish first inside tokio::join!.
    let ts = chrono::Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap().timestamp_millis();
    let make_request = || analyze_request(current_session_dto("73.45.123.45", DESKTOP_UA, ts), vec![], "user@example.com");

    let config = Config::default();
    let first = pipeline::run(make_request(), Arc::new(rules_only_detectors()), Arc::new(StaticGeoLookup), &config, "req_a").await.unwrap();
    let second = pipeline::run(make_request(), Arc::new(rules_only_detectors()), Arc::new(StaticGeoLookup), &config, "req_b").await.unwrap();

    assert_eq!(first.scores.ip, second.scores.ip);
    assert_eq!(first.scores.datetime, second.scores.datetime);
    assert_eq!(first.scores.user_agent, second.scores.user_agent);
    assert_eq!(first.scores.geolocation, second.scores.geolocation);
    assert_eq!(first.scores.overall, second.scores.overall);
}

fn test_app_state(config: Config) -> AppState {
    AppState {
        config,
        detectors: Arc::new(rules_only_detectors()),
        geo_lookup: Arc::new(StaticGeoLookup),
        rate_limiter: Arc::new(InProcessRateLimiter::new()),
        result_cache: Arc::new(InProcessCache::new()),
        audit: Arc::new(LoggingAudit),
        models_loaded: false,
    }
}

#[actix_web::test]
async fn analyze_endpoint_maps_validation_failure_to_400() {
    let mut config = Config::default();
    config.require_api_key = false;
    let state = actix_web::web::Data::new(test_app_state(config));

    let app = actix_web::test::init_service(
        actix_web::App::new().app_data(state.clone()).route("/v1/analyze", actix_web::web::post().to(api::analyze)),
    )
    .await;

    let req = actix_web::test::TestRequest::post()
        .uri("/v1/analyze")
        .set_json(serde_json::json!({
            "currentSession": {"ip": "1.2.3.4", "userAgent": "x", "timestamp": 0},
            "loginHistory": [],
            "userId": "user@example.com"
        }))
        .to_request();

    let resp = actix_web::test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn analyze_endpoint_maps_exhausted_rate_limit_to_429() {
    let mut config = Config::default();
    config.require_api_key = false;
    config.rate_limit_requests = 1;
    let state = actix_web::web::Data::new(test_app_state(config));

    let app = actix_web::test::init_service(
        actix_web::App::new().app_data(state.clone()).route("/v1/analyze", actix_web::web::post().to(api::analyze)),
    )
    .await;

    let ts = chrono::Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap().timestamp_millis();
    let body = serde_json::json!({
        "currentSession": {"ip": "73.45.123.45", "userAgent": DESKTOP_UA, "timestamp": ts},
        "loginHistory": [],
        "userId": "user@example.com"
    });

    let first = actix_web::test::TestRequest::post().uri("/v1/analyze").set_json(&body).to_request();
    let resp1 = actix_web::test::call_service(&app, first).await;
    assert_eq!(resp1.status(), 200);

    let second = actix_web::test::TestRequest::post().uri("/v1/analyze").set_json(&body).to_request();
    let resp2 = actix_web::test::call_service(&app, second).await;
    assert_eq!(resp2.status(), 429);
}
