//! Employer-link resolution.
//!
//! Boards link to their own detail pages or click-tracking redirects. The
//! resolver walks past those to the employer's application page, one
//! manual hop at a time, and never fails: anything that goes wrong ends in
//! [`LinkResolution::NotResolved`] with a reason.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::extractors::is_aggregator_host;
use crate::text::{clean_text, fold_diacritics};
use crate::traits::PageFetcher;

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
}

/// Words that mark an anchor as the apply action.
const APPLY_MARKERS: &[&str] = &[
    "bewerb",
    "apply",
    "application",
    "zur stelle",
    "zum arbeitgeber",
    "stellenanzeige des arbeitgebers",
    "redirect",
    "/go/",
];

/// Why no employer URL came out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Still on the board after this many requests
    HopLimit { hops: usize },
    /// The page had no apply link to follow
    NoApplyLink,
    /// Non-2xx response without a `Location`
    HttpStatus(u16),
    /// Request failed before a response arrived
    Fetch(String),
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::HopLimit { hops } => write!(f, "hop limit reached after {} requests", hops),
            UnresolvedReason::NoApplyLink => f.write_str("no apply link on page"),
            UnresolvedReason::HttpStatus(status) => write!(f, "HTTP {}", status),
            UnresolvedReason::Fetch(err) => write!(f, "fetch failed: {}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResolution {
    Resolved(Url),
    NotResolved { reason: UnresolvedReason },
}

impl LinkResolution {
    fn not_resolved(reason: UnresolvedReason) -> Self {
        LinkResolution::NotResolved { reason }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            LinkResolution::Resolved(url) => Some(url),
            LinkResolution::NotResolved { .. } => None,
        }
    }
}

/// Follows aggregator pages and redirects to the employer's own URL.
#[derive(Clone)]
pub struct EmployerLinkResolver {
    fetcher: Arc<dyn PageFetcher>,
    hop_limit: usize,
}

impl EmployerLinkResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, hop_limit: usize) -> Self {
        Self { fetcher, hop_limit }
    }

    /// Resolve `start` past every host in `aggregator_hosts`.
    ///
    /// Every request counts as one hop. A URL that is already off the
    /// board is returned without any request.
    pub async fn resolve(&self, start: &Url, aggregator_hosts: &[&str]) -> LinkResolution {
        if !is_aggregator_host(start, aggregator_hosts) {
            return LinkResolution::Resolved(start.clone());
        }

        let mut current = start.clone();
        for hop in 1..=self.hop_limit {
            tracing::debug!(url = %current, hop, "Resolving employer link");

            let page = match self.fetcher.fetch_manual(&current).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::debug!(url = %current, error = %e, "Employer link fetch failed");
                    return LinkResolution::not_resolved(UnresolvedReason::Fetch(e.to_string()));
                }
            };

            if page.is_redirect() {
                let Some(target) = page.redirect_target() else {
                    return LinkResolution::not_resolved(UnresolvedReason::HttpStatus(page.status));
                };
                if !is_aggregator_host(&target, aggregator_hosts) {
                    return LinkResolution::Resolved(target);
                }
                current = target;
                continue;
            }

            if !page.is_success() {
                return LinkResolution::not_resolved(UnresolvedReason::HttpStatus(page.status));
            }

            match find_apply_link(&page.body, &page.url, aggregator_hosts) {
                Some(ApplyLink::External(url)) => return LinkResolution::Resolved(url),
                Some(ApplyLink::Endpoint(url)) => current = url,
                None => return LinkResolution::not_resolved(UnresolvedReason::NoApplyLink),
            }
        }

        LinkResolution::not_resolved(UnresolvedReason::HopLimit {
            hops: self.hop_limit,
        })
    }
}

enum ApplyLink {
    /// Apply link that already leaves the board
    External(Url),
    /// Apply endpoint on the board itself, to be followed
    Endpoint(Url),
}

/// An external apply link wins over an on-board apply endpoint.
fn find_apply_link(html: &str, page_url: &Url, aggregator_hosts: &[&str]) -> Option<ApplyLink> {
    let document = Html::parse_document(html);
    let mut endpoint = None;

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = page_url
            .join(href.trim())
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
        else {
            continue;
        };

        let label = format!(
            "{} {} {} {}",
            clean_text(&anchor.text().collect::<String>()),
            href,
            anchor.value().attr("class").unwrap_or_default(),
            anchor.value().attr("id").unwrap_or_default(),
        );
        let label = fold_diacritics(&label);
        if !APPLY_MARKERS.iter().any(|marker| label.contains(marker)) {
            continue;
        }

        if !is_aggregator_host(&url, aggregator_hosts) {
            return Some(ApplyLink::External(url));
        }
        if endpoint.is_none() && url != *page_url {
            endpoint = Some(url);
        }
    }

    endpoint.map(ApplyLink::Endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    const HOSTS: &[&str] = &["medijobs.de", "medijobs-apply.de"];

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn resolver(fetcher: &MockFetcher) -> EmployerLinkResolver {
        EmployerLinkResolver::new(Arc::new(fetcher.clone()), 3)
    }

    #[tokio::test]
    async fn external_start_needs_no_request() {
        let fetcher = MockFetcher::new();
        let start = url("https://karriere.klinikum.de/job/1");

        let result = resolver(&fetcher).resolve(&start, HOSTS).await;

        assert_eq!(result, LinkResolution::Resolved(start));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn third_redirect_leaves_the_board() {
        let fetcher = MockFetcher::new()
            .with_redirect("https://www.medijobs.de/job/1/apply", "https://r.medijobs-apply.de/a")
            .with_redirect("https://r.medijobs-apply.de/a", "https://r.medijobs-apply.de/b")
            .with_redirect("https://r.medijobs-apply.de/b", "https://jobs.uniklinik.de/42");

        let result = resolver(&fetcher)
            .resolve(&url("https://www.medijobs.de/job/1/apply"), HOSTS)
            .await;

        assert_eq!(result.url().map(Url::as_str), Some("https://jobs.uniklinik.de/42"));
        assert_eq!(fetcher.call_count(), 3);
        assert!(!fetcher.was_requested("https://jobs.uniklinik.de/42"));
        assert!(fetcher.calls().iter().all(|c| c.manual));
    }

    #[tokio::test]
    async fn gives_up_at_hop_limit() {
        let fetcher = MockFetcher::new()
            .with_redirect("https://www.medijobs.de/a", "/b")
            .with_redirect("https://www.medijobs.de/b", "/c")
            .with_redirect("https://www.medijobs.de/c", "/d");

        let result = resolver(&fetcher).resolve(&url("https://www.medijobs.de/a"), HOSTS).await;

        assert_eq!(
            result,
            LinkResolution::NotResolved {
                reason: UnresolvedReason::HopLimit { hops: 3 }
            }
        );
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn scans_detail_page_for_external_apply_link() {
        let html = r#"
            <a href="https://www.facebook.com/medijobs">Folgen</a>
            <a href="/merken">Merken</a>
            <a class="btn" href="https://karriere.helios.de/stelle/77">Jetzt bewerben</a>
        "#;
        let fetcher = MockFetcher::new().with_page("https://www.medijobs.de/job/77", html);

        let result = resolver(&fetcher).resolve(&url("https://www.medijobs.de/job/77"), HOSTS).await;

        assert_eq!(result.url().map(Url::as_str), Some("https://karriere.helios.de/stelle/77"));
    }

    #[tokio::test]
    async fn follows_on_board_apply_endpoint() {
        let fetcher = MockFetcher::new()
            .with_page(
                "https://www.medijobs.de/job/9",
                r#"<a href="/job/9/bewerben">Bewerben</a>"#,
            )
            .with_redirect("https://www.medijobs.de/job/9/bewerben", "https://bewerbung.vivantes.de/9");

        let result = resolver(&fetcher).resolve(&url("https://www.medijobs.de/job/9"), HOSTS).await;

        assert_eq!(result.url().map(Url::as_str), Some("https://bewerbung.vivantes.de/9"));
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn failures_become_reasons() {
        let fetcher = MockFetcher::new()
            .with_timeout("https://www.medijobs.de/slow")
            .with_refused("https://www.medijobs.de/down")
            .with_status("https://www.medijobs.de/gone", 410)
            .with_page("https://www.medijobs.de/bare", "<p>Keine Links</p>");
        let r = resolver(&fetcher);

        assert!(matches!(
            r.resolve(&url("https://www.medijobs.de/slow"), HOSTS).await,
            LinkResolution::NotResolved { reason: UnresolvedReason::Fetch(_) }
        ));
        assert!(matches!(
            r.resolve(&url("https://www.medijobs.de/down"), HOSTS).await,
            LinkResolution::NotResolved { reason: UnresolvedReason::Fetch(_) }
        ));
        assert_eq!(
            r.resolve(&url("https://www.medijobs.de/gone"), HOSTS).await,
            LinkResolution::NotResolved { reason: UnresolvedReason::HttpStatus(410) }
        );
        assert_eq!(
            r.resolve(&url("https://www.medijobs.de/bare"), HOSTS).await,
            LinkResolution::NotResolved { reason: UnresolvedReason::NoApplyLink }
        );
    }
}
