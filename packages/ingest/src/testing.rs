//! Testing utilities including mock implementations.
//!
//! These let the pipeline run end to end without network access, a model
//! API or a real clock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

use crate::error::{ClassifierError, CrawlError, CrawlResult};
use crate::pipeline::Clock;
use crate::traits::{FetchedPage, ModelLabels, PageFetcher, TextClassifier};

#[derive(Debug, Clone)]
enum Canned {
    Page { status: u16, location: Option<String>, body: String },
    Timeout,
    Refused,
}

/// A mock fetcher for testing.
///
/// Returns canned responses by exact URL. Unknown URLs answer 404.
#[derive(Default, Clone)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, Canned>>>,
    calls: Arc<RwLock<Vec<MockFetchCall>>>,
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFetchCall {
    pub url: String,
    /// True for [`PageFetcher::fetch_manual`]
    pub manual: bool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(self, url: impl Into<String>, canned: Canned) -> Self {
        self.responses.write().unwrap().insert(url.into(), canned);
        self
    }

    /// Answer `url` with a 200 and this body.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with(
            url,
            Canned::Page {
                status: 200,
                location: None,
                body: body.into(),
            },
        )
    }

    /// Answer `url` with a bodiless status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.with(
            url,
            Canned::Page {
                status,
                location: None,
                body: String::new(),
            },
        )
    }

    /// Answer `url` with a 302 to `location`.
    pub fn with_redirect(self, url: impl Into<String>, location: impl Into<String>) -> Self {
        self.with(
            url,
            Canned::Page {
                status: 302,
                location: Some(location.into()),
                body: String::new(),
            },
        )
    }

    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.with(url, Canned::Timeout)
    }

    pub fn with_refused(self, url: impl Into<String>) -> Self {
        self.with(url, Canned::Refused)
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<MockFetchCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.calls.read().unwrap().iter().any(|c| c.url == url)
    }

    fn respond(&self, url: &Url, manual: bool) -> CrawlResult<FetchedPage> {
        self.calls.write().unwrap().push(MockFetchCall {
            url: url.to_string(),
            manual,
        });

        let canned = self.responses.read().unwrap().get(url.as_str()).cloned();
        match canned {
            Some(Canned::Page {
                status,
                location,
                body,
            }) => {
                if !manual && location.is_some() {
                    // Follow like a redirecting client would.
                    let target = location
                        .as_deref()
                        .and_then(|l| url.join(l).ok())
                        .ok_or_else(|| CrawlError::InvalidUrl {
                            url: url.to_string(),
                        })?;
                    return self.respond(&target, false);
                }
                Ok(FetchedPage {
                    url: url.clone(),
                    status,
                    location,
                    body,
                })
            }
            Some(Canned::Timeout) => Err(CrawlError::Timeout {
                url: url.to_string(),
            }),
            Some(Canned::Refused) => Err(CrawlError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Mock connection refused",
            )))),
            None => Ok(FetchedPage::with_status(url.clone(), 404)),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage> {
        self.respond(url, false)
    }

    async fn fetch_manual(&self, url: &Url) -> CrawlResult<FetchedPage> {
        self.respond(url, true)
    }
}

/// A mock text classifier for testing.
#[derive(Clone)]
pub struct MockClassifier {
    response: Arc<RwLock<Option<ModelLabels>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockClassifier {
    /// Always answers with `labels`.
    pub fn answering(labels: ModelLabels) -> Self {
        Self {
            response: Arc::new(RwLock::new(Some(labels))),
            calls: Arc::default(),
        }
    }

    /// Always fails, like an unreachable API.
    pub fn failing() -> Self {
        Self {
            response: Arc::new(RwLock::new(None)),
            calls: Arc::default(),
        }
    }

    /// Titles it was asked about.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl TextClassifier for MockClassifier {
    async fn classify(
        &self,
        title: &str,
        _employer_name: Option<&str>,
        _location: Option<&str>,
    ) -> Result<ModelLabels, ClassifierError> {
        self.calls.write().unwrap().push(title.to_string());
        self.response
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| ClassifierError::Request("mock classifier unavailable".into()))
    }
}

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap()
    }
}
