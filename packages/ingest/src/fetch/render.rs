//! Fetching through the browser-rendering service.
//!
//! The service takes `{url, timeout, waitForSelector}` on `POST /render`
//! and answers `{html, url}` once the page has rendered.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{CrawlError, CrawlResult};
use crate::traits::{FetchedPage, PageFetcher};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    url: &'a str,
    /// Milliseconds the service may spend on the page
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_selector: Option<&'a str>,
}

#[derive(Deserialize)]
struct RenderResponse {
    html: String,
    url: Option<String>,
}

#[derive(Clone)]
pub struct RenderingFetcher {
    client: reqwest::Client,
    endpoint: Url,
    page_timeout: Duration,
    wait_for_selector: Option<String>,
}

impl RenderingFetcher {
    /// `service_url` is the service root; requests go to `{service_url}/render`.
    pub fn new(service_url: &str, page_timeout: Duration) -> CrawlResult<Self> {
        let root = service_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{}/render", root)).map_err(|_| CrawlError::InvalidUrl {
            url: service_url.to_string(),
        })?;
        let client = reqwest::Client::builder()
            // Rendering takes longer than the page budget it is given.
            .timeout(page_timeout + Duration::from_secs(15))
            .build()
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            endpoint,
            page_timeout,
            wait_for_selector: None,
        })
    }

    /// Selector the service waits for before taking its snapshot.
    pub fn with_wait_for_selector(mut self, selector: Option<&str>) -> Self {
        self.wait_for_selector = selector.map(str::to_string);
        self
    }
}

#[async_trait]
impl PageFetcher for RenderingFetcher {
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage> {
        let request = RenderRequest {
            url: url.as_str(),
            timeout: u64::try_from(self.page_timeout.as_millis()).unwrap_or(u64::MAX),
            wait_for_selector: self.wait_for_selector.as_deref(),
        };
        debug!(url = %url, "Rendering page");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| CrawlError::from_reqwest(e, url.as_str()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            warn!(url = %url, status = status.as_u16(), "Rendering service refused page");
            let message = if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, body)
            };
            return Err(CrawlError::Render(message));
        }

        let rendered: RenderResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::Render(format!("unparsable response: {}", e)))?;

        let final_url = rendered
            .url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or_else(|| url.clone());

        Ok(FetchedPage::ok(final_url, rendered.html))
    }
}
