//! Paginated crawling of one source.

use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::traits::PageFetcher;
use crate::types::{ScrapedListing, SourceName};

/// Why pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `page` produced no listings
    EmptyPage { page: u32 },
    /// `page` answered with a non-success status
    HttpStatus { page: u32, status: u16 },
    /// `page` could not be fetched at all
    FetchFailed { page: u32, error: String },
    /// The page ceiling was reached
    MaxPages,
}

impl StopReason {
    /// Whether pagination ended because something went wrong.
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::HttpStatus { .. } | StopReason::FetchFailed { .. })
    }
}

/// Everything one source produced in one run.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub source: SourceName,
    /// In page order, deduplicated across pages
    pub listings: Vec<ScrapedListing>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

impl CrawlOutcome {
    /// A source counts as fully seen only if pagination ended cleanly and
    /// found something. Expiry relies on this.
    pub fn is_complete(&self) -> bool {
        !self.stop.is_failure() && !self.listings.is_empty()
    }
}

pub struct SourceCrawler<'a> {
    fetcher: &'a dyn PageFetcher,
    max_pages: u32,
    page_delay: Duration,
}

impl<'a> SourceCrawler<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, max_pages: u32, page_delay: Duration) -> Self {
        Self {
            fetcher,
            max_pages,
            page_delay,
        }
    }

    /// Fetch pages 1..=max_pages in order until one is empty or fails.
    ///
    /// Never returns an error: a failed page ends pagination and whatever
    /// was collected so far is kept.
    pub async fn crawl(&self, source: SourceName, base: &Url) -> CrawlOutcome {
        let mut listings: Vec<ScrapedListing> = Vec::new();
        let mut pages_fetched = 0;
        let mut stop = StopReason::MaxPages;

        for page in 1..=self.max_pages {
            if page > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let url = source.page_url(base, page);
            debug!(source = %source, page, url = %url, "Fetching result page");

            let fetched = match self.fetcher.fetch(&url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!(source = %source, page, error = %e, "Result page fetch failed");
                    stop = StopReason::FetchFailed {
                        page,
                        error: e.to_string(),
                    };
                    break;
                }
            };
            pages_fetched += 1;

            if !fetched.is_success() {
                warn!(source = %source, page, status = fetched.status, "Result page returned error status");
                stop = StopReason::HttpStatus {
                    page,
                    status: fetched.status,
                };
                break;
            }

            let found = source.extract(&fetched.body, &fetched.url);
            debug!(source = %source, page, count = found.len(), "Extracted listings");
            if found.is_empty() {
                stop = StopReason::EmptyPage { page };
                break;
            }

            for listing in found {
                if !listings
                    .iter()
                    .any(|known| known.source_unique_id == listing.source_unique_id)
                {
                    listings.push(listing);
                }
            }
        }

        info!(
            source = %source,
            pages = pages_fetched,
            count = listings.len(),
            stop = ?stop,
            "Source crawl finished"
        );

        CrawlOutcome {
            source,
            listings,
            pages_fetched,
            stop,
        }
    }
}
