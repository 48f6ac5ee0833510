use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationDto {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CurrentSessionDto {
    pub ip: String,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    pub timestamp: i64,
    #[serde(rename = "acceptLanguage")]
    pub accept_language: Option<String>,
    #[serde(rename = "screenResolution")]
    pub screen_resolution: Option<String>,
    pub timezone: Option<String>,
    pub platform: Option<String>,
    #[serde(rename = "webglRenderer")]
    pub webgl_renderer: Option<String>,
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(rename = "canvasFingerprint")]
    pub canvas_fingerprint: Option<String>,
    #[serde(rename = "audioFingerprint")]
    pub audio_fingerprint: Option<String>,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(rename = "touchSupport")]
    pub touch_support: Option<bool>,
    #[serde(rename = "deviceMemory")]
    pub device_memory: Option<i64>,
    #[serde(rename = "hardwareConcurrency")]
    pub hardware_concurrency: Option<i64>,
    pub referrer: Option<String>,
    #[serde(rename = "isCookieEnabled")]
    pub is_cookie_enabled: Option<bool>,
    #[serde(rename = "isJavaEnabled")]
    pub is_java_enabled: Option<bool>,
    #[serde(rename = "browserVersion")]
    pub browser_version: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoginStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginHistoryItemDto {
    pub ip: String,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    pub timestamp: i64,
    pub location: LocationDto,
    #[serde(rename = "loginStatus")]
    pub login_status: LoginStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "currentSession")]
    pub current_session: CurrentSessionDto,
    #[serde(rename = "loginHistory", default)]
    pub login_history: Vec<LoginHistoryItemDto>,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskScoresDto {
    pub ip: u8,
    pub datetime: u8,
    #[serde(rename = "userAgent")]
    pub user_agent: u8,
    pub geolocation: u8,
    pub overall: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub timestamp: i64,
    #[serde(rename = "processingTime")]
    pub processing_time: u64,
    #[serde(rename = "modelsVersion")]
    pub models_version: String,
    #[serde(rename = "cacheHit", skip_serializing_if = "std::ops::Not::not")]
    pub cache_hit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub meta: ResponseMeta,
    pub scores: RiskScoresDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: i64,
    pub version: String,
    pub models_loaded: bool,
    pub cache_connected: bool,
    pub audit_connected: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "wasLegitimate")]
    pub was_legitimate: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
}
