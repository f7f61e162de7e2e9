//! Page fetching.

use async_trait::async_trait;
use url::Url;

use crate::error::CrawlResult;

/// One HTTP response, reduced to what the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL the body was served from, after any redirects the fetcher followed
    pub url: Url,

    pub status: u16,

    /// Raw `Location` header, only present on unfollowed redirects
    pub location: Option<String>,

    pub body: String,
}

impl FetchedPage {
    pub fn ok(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    pub fn redirect(url: Url, status: u16, location: impl Into<String>) -> Self {
        Self {
            url,
            status,
            location: Some(location.into()),
            body: String::new(),
        }
    }

    pub fn with_status(url: Url, status: u16) -> Self {
        Self {
            url,
            status,
            location: None,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && self.location.is_some()
    }

    /// The `Location` header resolved against the request URL.
    pub fn redirect_target(&self) -> Option<Url> {
        self.location
            .as_deref()
            .and_then(|location| self.url.join(location).ok())
    }
}

/// Fetches pages over HTTP or through a rendering service.
///
/// Non-2xx responses are returned as pages, not errors. Errors are for
/// requests that never produced a response.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url`, following redirects.
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage>;

    /// GET `url` without following redirects, so the caller can inspect
    /// `Location` hop by hop.
    ///
    /// Fetchers that cannot observe redirects fall back to [`fetch`].
    ///
    /// [`fetch`]: PageFetcher::fetch
    async fn fetch_manual(&self, url: &Url) -> CrawlResult<FetchedPage> {
        self.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_location_resolves_against_request() {
        let url = Url::parse("https://www.arztboerse.de/job/17").unwrap();
        let page = FetchedPage::redirect(url, 301, "/bewerben?id=17");
        assert!(page.is_redirect());
        assert_eq!(
            page.redirect_target().unwrap().as_str(),
            "https://www.arztboerse.de/bewerben?id=17"
        );
    }

    #[test]
    fn redirect_without_location_is_not_followed() {
        let url = Url::parse("https://www.arztboerse.de/job/17").unwrap();
        let page = FetchedPage::with_status(url, 302);
        assert!(!page.is_redirect());
        assert!(page.redirect_target().is_none());
    }
}
