//! Plain HTTP fetching with reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use tracing::{debug, warn};
use url::Url;

use crate::config::IngestConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::traits::{FetchedPage, PageFetcher};

/// Redirects followed by [`PageFetcher::fetch`].
const MAX_REDIRECTS: usize = 5;

/// HTTP fetcher sending a descriptive User-Agent and a fixed
/// Accept-Language on every request.
///
/// Holds two clients: one that follows redirects for result pages and
/// one that does not, for hop-by-hop link resolution.
#[derive(Clone)]
pub struct HttpFetcher {
    following: reqwest::Client,
    manual: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &IngestConfig) -> CrawlResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let build = |policy: Policy| {
            reqwest::Client::builder()
                .default_headers(headers.clone())
                .timeout(config.request_timeout)
                .redirect(policy)
                .build()
                .map_err(|e| CrawlError::Http(Box::new(e)))
        };

        Ok(Self {
            following: build(Policy::limited(MAX_REDIRECTS))?,
            manual: build(Policy::none())?,
        })
    }

    async fn get(&self, client: &reqwest::Client, url: &Url) -> CrawlResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");
        let response = client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            CrawlError::from_reqwest(e, url.as_str())
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| CrawlError::from_reqwest(e, url.as_str()))?;

        debug!(url = %final_url, status, bytes = body.len(), "HTTP fetch finished");
        Ok(FetchedPage {
            url: final_url,
            status,
            location,
            body,
        })
    }
}

fn header_value(value: &str) -> CrawlResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| CrawlError::Http(Box::new(e)))
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage> {
        self.get(&self.following, url).await
    }

    async fn fetch_manual(&self, url: &Url) -> CrawlResult<FetchedPage> {
        self.get(&self.manual, url).await
    }
}
