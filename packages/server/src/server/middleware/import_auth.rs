use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::common::ApiError;
use crate::domains::auth::{JwtService, Operator};
use crate::server::app::AppState;

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Guard for the import trigger
///
/// Passes with the scheduler's shared secret or an admin bearer token.
/// A wrong secret or a missing/invalid token is 401, a valid non-admin
/// token is 403.
pub async fn require_import_access(
    Extension(state): Extension<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(secret) = request.headers().get(CRON_SECRET_HEADER) {
        if secret.as_bytes() == state.cron_secret.as_bytes() {
            debug!("Import triggered with cron secret");
            return next.run(request).await;
        }
        warn!("Import trigger with wrong cron secret");
        return ApiError::AuthenticationRequired.into_response();
    }

    match bearer_operator(request.headers(), &state.jwt_service) {
        Some(operator) if operator.is_admin => {
            debug!(subject = %operator.subject, "Import triggered by admin");
            next.run(request).await
        }
        Some(operator) => {
            warn!(subject = %operator.subject, "Non-admin tried to trigger an import");
            ApiError::AdminRequired.into_response()
        }
        None => ApiError::AuthenticationRequired.into_response(),
    }
}

fn bearer_operator(headers: &HeaderMap, jwt_service: &JwtService) -> Option<Operator> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    match jwt_service.operator(token.trim()) {
        Ok(operator) => Some(operator),
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers_with(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_resolved() {
        let jwt = JwtService::new("secret", "job-ingest");
        let token = jwt.issue("ops", false, Duration::hours(1)).unwrap();

        let operator = bearer_operator(&headers_with(&format!("Bearer {}", token)), &jwt).unwrap();
        assert_eq!(operator.subject, "ops");
        assert!(!operator.is_admin);
    }

    #[test]
    fn token_without_bearer_scheme_is_ignored() {
        let jwt = JwtService::new("secret", "job-ingest");
        let token = jwt.issue("ops", true, Duration::hours(1)).unwrap();

        assert!(bearer_operator(&headers_with(&token), &jwt).is_none());
        assert!(bearer_operator(&HeaderMap::new(), &jwt).is_none());
    }
}
