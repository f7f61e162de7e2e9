//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::domains::import::ImportService;
use crate::server::middleware::{require_import_access, CRON_SECRET_HEADER};
use crate::server::routes::{health_handler, import_jobs_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub imports: Arc<ImportService>,
    pub jwt_service: Arc<JwtService>,
    pub cron_secret: Arc<str>,
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, HeaderName::from_static(CRON_SECRET_HEADER)]);

    Router::new()
        .route(
            "/api/import/jobs",
            post(import_jobs_handler).layer(middleware::from_fn(require_import_access)),
        )
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
