use std::env;

/// Fixed fusion weights for the four factors, per spec: {0.30, 0.20, 0.25, 0.25}.
/// The other weight vector mentioned in the source must not ship.
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub ip: f64,
    pub datetime: f64,
    pub user_agent: f64,
    pub geolocation: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { ip: 0.30, datetime: 0.20, user_agent: 0.25, geolocation: 0.25 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub api_key: String,
    pub require_api_key: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub result_cache_ttl_secs: u64,
    pub request_timeout_ms: u64,
    pub geolocation_timeout_ms: u64,
    pub max_travel_speed_kmh: f64,
    pub fusion_weights: FusionWeights,
    pub model_bundle_dir: String,
    pub bundle_version: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            api_key: String::new(),
            require_api_key: true,
            rate_limit_requests: 100,
            rate_limit_window_secs: 60,
            result_cache_ttl_secs: 300,
            request_timeout_ms: 200,
            geolocation_timeout_ms: 100,
            max_travel_speed_kmh: 900.0,
            fusion_weights: FusionWeights::default(),
            model_bundle_dir: "./models".to_string(),
            bundle_version: "v1.0.0".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment (via `.env` + process env),
    /// falling back to the documented defaults for anything unset or
    /// unparsable. Mirrors the teacher's `dotenv().ok()` + `env::var(..)`
    /// pattern in `main.rs`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
            api_key: env::var("RISK_API_KEY").unwrap_or_default(),
            require_api_key: env_parsed("REQUIRE_API_KEY", defaults.require_api_key),
            rate_limit_requests: env_parsed("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            rate_limit_window_secs: env_parsed(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window_secs,
            ),
            result_cache_ttl_secs: env_parsed(
                "RESULT_CACHE_TTL_SECS",
                defaults.result_cache_ttl_secs,
            ),
            request_timeout_ms: env_parsed("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            geolocation_timeout_ms: env_parsed(
                "GEOLOCATION_TIMEOUT_MS",
                defaults.geolocation_timeout_ms,
            ),
            max_travel_speed_kmh: env_parsed(
                "MAX_TRAVEL_SPEED_KMH",
                defaults.max_travel_speed_kmh,
            ),
            fusion_weights: FusionWeights::default(),
            model_bundle_dir: env_or("MODEL_BUNDLE_DIR", defaults.model_bundle_dir),
            bundle_version: env_or("BUNDLE_VERSION", defaults.bundle_version),
            log_level: env_or("LOG_LEVEL", defaults.log_level),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
