//! Router tests for the import trigger and the health check.
//!
//! The app runs on an in-memory store and canned result pages, so no
//! database or network is involved.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use ingest::testing::MockFetcher;
use ingest::{IngestConfig, MemoryStore, Orchestrator};
use serde_json::Value;
use server_core::domains::auth::JwtService;
use server_core::domains::import::ImportService;
use server_core::server::{build_app, AppState};
use tower::ServiceExt;

const CRON_SECRET: &str = "cron-test-secret";

fn jwt_service() -> JwtService {
    JwtService::new("jwt-test-secret", "job-ingest")
}

fn board() -> MockFetcher {
    MockFetcher::new()
        .with_page(
            "https://www.stellenwerk-medizin.de/jobs?p=1",
            r#"<article data-job-id="1" data-employer="Klinikum Kassel" data-location="Kassel"
                        data-apply-url="https://karriere.klinikum-kassel.de/1">
                 <a href="/jobs/1"><h2>Facharzt Urologie</h2></a>
               </article>"#,
        )
        .with_page("https://www.stellenwerk-medizin.de/jobs?p=2", "<main></main>")
}

fn app_with(store: Arc<MemoryStore>) -> Router {
    let config = IngestConfig::default().with_page_delay(std::time::Duration::ZERO);
    let orchestrator = Orchestrator::new(store.clone(), Arc::new(board()), config);
    let imports = ImportService::new(orchestrator, store, chrono::Duration::minutes(10));

    build_app(AppState {
        imports: Arc::new(imports),
        jwt_service: Arc::new(jwt_service()),
        cron_secret: Arc::from(CRON_SECRET),
    })
}

fn trigger() -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri("/api/import/jobs")
        .header("content-type", "application/json")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const STELLENWERK_ONLY: &str = r#"{"sources":["stellenwerk"]}"#;

#[tokio::test]
async fn test_cron_secret_runs_an_import() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    let response = app
        .oneshot(
            trigger()
                .header("x-cron-secret", CRON_SECRET)
                .body(Body::from(STELLENWERK_ONLY))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["totalListings"], 1);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["budgetExhausted"], false);
    assert!(body["runId"].is_string());
    assert_eq!(store.listings().len(), 1);
}

#[tokio::test]
async fn test_admin_token_runs_an_import() {
    let token = jwt_service().issue("ops", true, chrono::Duration::hours(1)).unwrap();

    let response = app_with(Arc::new(MemoryStore::new()))
        .oneshot(
            trigger()
                .header("authorization", format!("Bearer {}", token))
                .body(Body::from(STELLENWERK_ONLY))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_credentials_are_rejected() {
    let store = Arc::new(MemoryStore::new());

    let response = app_with(store.clone())
        .oneshot(trigger().body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.logs().is_empty());
}

#[tokio::test]
async fn test_wrong_cron_secret_is_rejected() {
    let response = app_with(Arc::new(MemoryStore::new()))
        .oneshot(
            trigger()
                .header("x-cron-secret", "guess")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_from_another_issuer_is_rejected() {
    let token = JwtService::new("jwt-test-secret", "someone-else")
        .issue("ops", true, chrono::Duration::hours(1))
        .unwrap();

    let response = app_with(Arc::new(MemoryStore::new()))
        .oneshot(
            trigger()
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_token_is_forbidden() {
    let token = jwt_service().issue("editor", false, chrono::Duration::hours(1)).unwrap();

    let response = app_with(Arc::new(MemoryStore::new()))
        .oneshot(
            trigger()
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_source_is_a_bad_request() {
    let body = r#"{"sources":["monster"]}"#;

    let response = app_with(Arc::new(MemoryStore::new()))
        .oneshot(
            trigger()
                .header("x-cron-secret", CRON_SECRET)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("monster"));
}

#[tokio::test]
async fn test_second_trigger_hits_the_cooldown() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    let request = || {
        trigger()
            .header("x-cron-secret", CRON_SECRET)
            .body(Body::from(STELLENWERK_ONLY))
            .unwrap()
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key("retry-after"));
    assert_eq!(store.logs_with_action(ingest::RunAction::RunStarted).len(), 1);
}

#[tokio::test]
async fn test_health_reports_store_state() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());
    let request = || Request::builder().uri("/health").body(Body::empty()).unwrap();

    let healthy = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(healthy.status(), StatusCode::OK);
    assert_eq!(json_body(healthy).await["status"], "healthy");

    store.set_unavailable(true);
    let unhealthy = app.oneshot(request()).await.unwrap();
    assert_eq!(unhealthy.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(unhealthy).await["store"]["status"], "error");
}
