//! Rendering-service fetcher against a local stand-in for the service.

use std::time::Duration;

use ingest::{CrawlError, PageFetcher, RenderingFetcher, SourceName};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PORTAL_PAGE: &str = "https://karriere.klinikverbund-sued.de/stellen?page=1";

fn page_url() -> Url {
    Url::parse(PORTAL_PAGE).unwrap()
}

fn renderer(server: &MockServer) -> RenderingFetcher {
    RenderingFetcher::new(&server.uri(), Duration::from_secs(20)).unwrap()
}

#[tokio::test]
async fn test_render_request_carries_selector_and_timeout() {
    let server = MockServer::start().await;
    let selector = SourceName::Karriereportal.wait_for_selector().unwrap();

    Mock::given(method("POST"))
        .and(path("/render"))
        .and(body_json(json!({
            "url": PORTAL_PAGE,
            "timeout": 20000,
            "waitForSelector": selector,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "html": "<div data-testid=\"job-card\">Oberarzt</div>",
            "url": "https://karriere.klinikverbund-sued.de/stellen?page=1&lang=de",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = renderer(&server)
        .with_wait_for_selector(Some(selector))
        .fetch(&page_url())
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(
        page.url.as_str(),
        "https://karriere.klinikverbund-sued.de/stellen?page=1&lang=de"
    );
    assert!(page.body.contains("Oberarzt"));
}

#[tokio::test]
async fn test_render_request_omits_missing_selector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/render"))
        .and(body_json(json!({ "url": PORTAL_PAGE, "timeout": 20000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "html": "<main></main>" })))
        .expect(1)
        .mount(&server)
        .await;

    let page = renderer(&server).fetch(&page_url()).await.unwrap();

    // No url in the reply: the requested one stands.
    assert_eq!(page.url, page_url());
    assert_eq!(page.body, "<main></main>");
}

#[tokio::test]
async fn test_unparsable_final_url_falls_back_to_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "html": "<main>ok</main>",
            "url": "not a url",
        })))
        .mount(&server)
        .await;

    let page = renderer(&server).fetch(&page_url()).await.unwrap();

    assert_eq!(page.url, page_url());
}

#[tokio::test]
async fn test_service_error_becomes_render_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(502).set_body_string("browser crashed"))
        .mount(&server)
        .await;

    let err = renderer(&server).fetch(&page_url()).await.unwrap_err();

    match err {
        CrawlError::Render(message) => {
            assert!(message.starts_with("HTTP 502"));
            assert!(message.ends_with(": browser crashed"));
        }
        other => panic!("expected a render error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_error_body_leaves_message_bare() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = renderer(&server).fetch(&page_url()).await.unwrap_err();

    match err {
        CrawlError::Render(message) => {
            assert!(message.starts_with("HTTP 500"));
            assert!(!message.contains(':'));
        }
        other => panic!("expected a render error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reply_without_html_is_a_render_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "timeout" })))
        .mount(&server)
        .await;

    let err = renderer(&server).fetch(&page_url()).await.unwrap_err();

    assert!(matches!(err, CrawlError::Render(_)));
}
