use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

/// The taxonomy of errors the engine raises, per the error-handling design.
/// Only `Validation` and `RateLimited` carry diagnostic detail to the
/// caller; everything else surfaces a generic message.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed on field '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("request deadline elapsed before any scores were ready")]
    Timeout,

    #[error("internal error")]
    Internal(String),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation { field, message: message.into() }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            EngineError::Timeout => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error, message) = match self {
            EngineError::Validation { field, message } => {
                ("validation", format!("{field}: {message}"))
            }
            EngineError::RateLimited => ("rate_limited", "rate limit exceeded".to_string()),
            EngineError::Timeout | EngineError::Internal(_) => {
                ("internal", "internal server error".to_string())
            }
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error, message })
    }
}
