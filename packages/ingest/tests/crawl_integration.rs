//! Crawling and employer-link resolution against canned and local HTTP
//! servers.
//!
//! Covers:
//! 1. Pagination stops at the first empty page
//! 2. Result pages go out with the configured headers
//! 3. A redirect chain is followed hop by hop until it leaves the board

use std::sync::Arc;
use std::time::Duration;

use ingest::testing::MockFetcher;
use ingest::{
    EmployerLinkResolver, HttpFetcher, IngestConfig, LinkResolution, PageFetcher, SourceCrawler, SourceName,
    StopReason, UnresolvedReason,
};
use url::Url;
use wiremock::matchers::{header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stellenwerk_page(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| {
            format!(
                r#"<article data-job-id="{id}" data-employer="Klinikum {id}"><a href="/jobs/{id}"><h2>Assistenzarzt {id}</h2></a></article>"#
            )
        })
        .collect()
}

fn http_fetcher() -> HttpFetcher {
    let config = IngestConfig::default().with_request_timeout(Duration::from_secs(5));
    HttpFetcher::new(&config).unwrap()
}

#[tokio::test]
async fn test_crawl_stops_after_empty_page() {
    let fetcher = MockFetcher::new()
        .with_page("https://www.stellenwerk-medizin.de/jobs?p=1", stellenwerk_page(&[1, 2, 3]))
        .with_page("https://www.stellenwerk-medizin.de/jobs?p=2", "<main>Keine Treffer</main>")
        .with_page("https://www.stellenwerk-medizin.de/jobs?p=3", stellenwerk_page(&[4]));
    let base = Url::parse("https://www.stellenwerk-medizin.de/jobs").unwrap();

    let outcome = SourceCrawler::new(&fetcher, 10, Duration::ZERO)
        .crawl(SourceName::Stellenwerk, &base)
        .await;

    assert_eq!(outcome.stop, StopReason::EmptyPage { page: 2 });
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.listings.len(), 3);
    assert!(outcome.is_complete());
    assert!(!fetcher.was_requested("https://www.stellenwerk-medizin.de/jobs?p=3"));
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn test_crawl_over_http_sends_headers() {
    let server = MockServer::start().await;
    let config = IngestConfig::default();

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("p", "1"))
        .and(header("user-agent", config.user_agent.as_str()))
        .and(headers("accept-language", vec!["de-DE", "de;q=0.9", "en;q=0.5"]))
        .respond_with(ResponseTemplate::new(200).set_body_string(stellenwerk_page(&[10, 11])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&config).unwrap();
    let base = Url::parse(&format!("{}/jobs", server.uri())).unwrap();
    let outcome = SourceCrawler::new(&fetcher, 5, Duration::ZERO)
        .crawl(SourceName::Stellenwerk, &base)
        .await;

    assert_eq!(outcome.stop, StopReason::EmptyPage { page: 2 });
    let titles: Vec<_> = outcome.listings.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["Assistenzarzt 10", "Assistenzarzt 11"]);
    assert_eq!(outcome.listings[0].employer_name, "Klinikum 10");
}

#[tokio::test]
async fn test_crawl_server_error_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let base = Url::parse(&format!("{}/jobs", server.uri())).unwrap();
    let outcome = SourceCrawler::new(&http_fetcher(), 5, Duration::ZERO)
        .crawl(SourceName::Stellenwerk, &base)
        .await;

    assert_eq!(outcome.stop, StopReason::HttpStatus { page: 1, status: 503 });
    assert!(!outcome.is_complete());
}

/// Two redirects on the board's own host, then one to the employer.
/// The local server answers on 127.0.0.1; "localhost" plays the employer.
#[tokio::test]
async fn test_redirect_chain_resolves_to_employer() {
    let board = MockServer::start().await;
    let employer = MockServer::start().await;
    let employer_url = format!("http://localhost:{}/karriere/42", employer.address().port());

    Mock::given(method("GET"))
        .and(path("/job/42/apply"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/go/42"))
        .expect(1)
        .mount(&board)
        .await;
    Mock::given(method("GET"))
        .and(path("/go/42"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/redirect?to=42"))
        .expect(1)
        .mount(&board)
        .await;
    Mock::given(method("GET"))
        .and(path("/redirect"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", employer_url.as_str()))
        .expect(1)
        .mount(&board)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&employer)
        .await;

    let fetcher: Arc<dyn PageFetcher> = Arc::new(http_fetcher());
    let resolver = EmployerLinkResolver::new(fetcher, 3);
    let start = Url::parse(&format!("{}/job/42/apply", board.uri())).unwrap();

    let result = resolver.resolve(&start, &["127.0.0.1"]).await;

    assert_eq!(result.url().map(Url::as_str), Some(employer_url.as_str()));
}

#[tokio::test]
async fn test_resolution_reports_error_status() {
    let board = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&board)
        .await;

    let resolver = EmployerLinkResolver::new(Arc::new(http_fetcher()), 3);
    let start = Url::parse(&format!("{}/job/gone", board.uri())).unwrap();

    let result = resolver.resolve(&start, &["127.0.0.1"]).await;

    assert_eq!(
        result,
        LinkResolution::NotResolved {
            reason: UnresolvedReason::HttpStatus(410)
        }
    );
}
