//! Per-run tunables.

use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::error::{IngestError, Result};
use crate::types::SourceName;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; JobIngestBot/0.1; +https://example.org/bot)";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en;q=0.5";

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Result pages fetched per source at most
    pub max_pages: u32,

    /// Pause between two page fetches of the same source
    pub page_delay: Duration,

    /// Pause between two reconciled listings
    pub item_delay: Duration,

    /// Wall-clock ceiling for one run, checked before each listing
    pub execution_budget: Duration,

    /// How long an unseen review-queue listing survives before expiry
    pub grace_window: Duration,

    /// Unchanged listings that get region/employer-URL backfill per run
    pub backfill_limit: usize,

    /// Requests the employer-link resolver may make per listing
    pub hop_limit: usize,

    /// Timeout for every single outbound request
    pub request_timeout: Duration,

    pub user_agent: String,
    pub accept_language: String,

    base_urls: HashMap<SourceName, Url>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            page_delay: Duration::from_secs(1),
            item_delay: Duration::ZERO,
            execution_budget: Duration::from_secs(270),
            grace_window: Duration::from_secs(48 * 60 * 60),
            backfill_limit: 5,
            hop_limit: 3,
            request_timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            base_urls: HashMap::new(),
        }
    }
}

impl IngestConfig {
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn with_execution_budget(mut self, budget: Duration) -> Self {
        self.execution_budget = budget;
        self
    }

    pub fn with_grace_window(mut self, grace: Duration) -> Self {
        self.grace_window = grace;
        self
    }

    pub fn with_backfill_limit(mut self, limit: usize) -> Self {
        self.backfill_limit = limit;
        self
    }

    pub fn with_hop_limit(mut self, hops: usize) -> Self {
        self.hop_limit = hops;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Point a source at a different first page, e.g. a test server.
    pub fn with_base_url(mut self, source: SourceName, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| IngestError::Config(format!("invalid base URL for {}: {}", source, e)))?;
        self.base_urls.insert(source, parsed);
        Ok(self)
    }

    /// Configured first page of `source`.
    pub fn base_url(&self, source: SourceName) -> Result<Url> {
        match self.base_urls.get(&source) {
            Some(url) => Ok(url.clone()),
            None => Url::parse(source.default_base_url()).map_err(|e| {
                IngestError::Config(format!("invalid default base URL for {}: {}", source, e))
            }),
        }
    }

    pub(crate) fn grace_window_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.grace_window).unwrap_or_else(|_| chrono::Duration::days(36_500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.execution_budget, Duration::from_secs(270));
        assert_eq!(config.hop_limit, 3);
        assert_eq!(
            config.base_url(SourceName::Medijobs).unwrap().as_str(),
            "https://www.medijobs.de/jobs?fach=arzt"
        );
    }

    #[test]
    fn builders_override_defaults() {
        let config = IngestConfig::default()
            .with_item_delay(Duration::from_millis(250))
            .with_hop_limit(5)
            .with_user_agent("probe/1.0");
        assert_eq!(config.item_delay, Duration::from_millis(250));
        assert_eq!(config.hop_limit, 5);
        assert_eq!(config.user_agent, "probe/1.0");
        assert_eq!(config.accept_language, DEFAULT_ACCEPT_LANGUAGE);
    }

    #[test]
    fn base_url_override() {
        let config = IngestConfig::default()
            .with_base_url(SourceName::Stellenwerk, "http://127.0.0.1:9000/jobs")
            .unwrap();
        assert_eq!(
            config.base_url(SourceName::Stellenwerk).unwrap().as_str(),
            "http://127.0.0.1:9000/jobs"
        );
        assert!(IngestConfig::default()
            .with_base_url(SourceName::Stellenwerk, "not a url")
            .is_err());
    }
}
