use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domains::import::TriggerError;

/// Errors returned by the HTTP API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Import ran recently, retry in {retry_after_secs}s")]
    CoolingDown { retry_after_secs: i64 },

    #[error("An import run is already in progress")]
    AlreadyRunning,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ApiError::AdminRequired => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::CoolingDown { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::AlreadyRunning => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TriggerError> for ApiError {
    fn from(err: TriggerError) -> Self {
        match err {
            TriggerError::CoolingDown { retry_after, .. } => ApiError::CoolingDown {
                retry_after_secs: retry_after.num_seconds().max(1),
            },
            TriggerError::AlreadyRunning => ApiError::AlreadyRunning,
            other => ApiError::InternalError(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::InternalError(e) = &self {
            tracing::error!(error = %e, "Request failed");
        }

        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if let ApiError::CoolingDown { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}
