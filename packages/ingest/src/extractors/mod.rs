//! Per-source HTML listing extraction.
//!
//! Every source gets its own rules because the boards share no markup
//! conventions, but all of them converge on [`ScrapedListing`]. The
//! orchestrator only ever calls [`SourceName::extract`] and the profile
//! methods below, so nothing outside this module knows a selector or a
//! hostname.
//!
//! Extraction is pure: the same markup always yields the same listings,
//! and malformed markup yields fewer listings rather than an error.

mod arztboerse;
mod jsonld;
mod karriereportal;
mod klinikstellen;
mod medijobs;
mod stellenwerk;

use std::collections::HashSet;
use url::Url;

use crate::types::{ScrapedListing, SourceName};

impl SourceName {
    /// Extract listings from one result page.
    ///
    /// `page_url` is only used to resolve relative links.
    pub fn extract(&self, html: &str, page_url: &Url) -> Vec<ScrapedListing> {
        let listings = match self {
            SourceName::Klinikstellen => klinikstellen::extract(html, page_url),
            SourceName::Medijobs => medijobs::extract(html, page_url),
            SourceName::Arztboerse => arztboerse::extract(html, page_url),
            SourceName::Stellenwerk => stellenwerk::extract(html, page_url),
            SourceName::Karriereportal => karriereportal::extract(html, page_url),
        };
        dedup_by_unique_id(listings)
    }

    /// First result page when no override is configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            SourceName::Klinikstellen => "https://www.klinikstellen.de/stellenangebote/aerzte",
            SourceName::Medijobs => "https://www.medijobs.de/jobs?fach=arzt",
            SourceName::Arztboerse => "https://www.arztboerse.de/stellen",
            SourceName::Stellenwerk => "https://www.stellenwerk-medizin.de/jobs",
            SourceName::Karriereportal => "https://www.karriereportal-klinik.de/suche",
        }
    }

    /// Hostnames that belong to the board itself. An employer link must
    /// resolve past all of these.
    pub fn aggregator_hosts(&self) -> &'static [&'static str] {
        match self {
            SourceName::Klinikstellen => &["klinikstellen.de"],
            SourceName::Medijobs => &["medijobs.de", "medijobs-apply.de"],
            SourceName::Arztboerse => &["arztboerse.de"],
            SourceName::Stellenwerk => &["stellenwerk-medizin.de", "stellenwerk.de"],
            SourceName::Karriereportal => &["karriereportal-klinik.de", "kp-redirect.de"],
        }
    }

    /// Whether result pages only render their listings with JavaScript.
    pub fn requires_rendering(&self) -> bool {
        matches!(self, SourceName::Karriereportal)
    }

    /// Selector the rendering service waits for before snapshotting.
    pub fn wait_for_selector(&self) -> Option<&'static str> {
        match self {
            SourceName::Karriereportal => Some(karriereportal::CARD_SELECTOR),
            _ => None,
        }
    }

    /// URL of result page `page` (1-based).
    pub fn page_url(&self, base: &Url, page: u32) -> Url {
        match self {
            SourceName::Klinikstellen | SourceName::Karriereportal => {
                with_query_param(base, "page", page)
            }
            SourceName::Medijobs => with_query_param(base, "seite", page),
            SourceName::Stellenwerk => with_query_param(base, "p", page),
            SourceName::Arztboerse => {
                if page <= 1 {
                    return base.clone();
                }
                let mut url = base.clone();
                let path = format!("{}/seite/{}", base.path().trim_end_matches('/'), page);
                url.set_path(&path);
                url
            }
        }
    }
}

/// True when `url` is hosted on one of `hosts` or a subdomain of one.
pub fn is_aggregator_host(url: &Url, hosts: &[&str]) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_start_matches("www.");
    hosts
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
}

fn with_query_param(base: &Url, key: &str, page: u32) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(key, &page.to_string());
    }
    url
}

/// Resolve an href against the page URL, keeping only http(s) links.
fn resolve_link(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let url = page_url.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Detail URL without query string or fragment.
fn canonical_id(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_query(None);
    canonical.set_fragment(None);
    canonical.to_string()
}

/// Slice `text[start..start + len]`, clamped to char boundaries.
fn window(text: &str, start: usize, len: usize) -> &str {
    let mut end = (start + len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut start = start.min(end);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    &text[start..end]
}

fn dedup_by_unique_id(listings: Vec<ScrapedListing>) -> Vec<ScrapedListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.source_unique_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn query_page_urls_replace_existing_param() {
        let base = url("https://www.medijobs.de/jobs?fach=arzt&seite=4");
        let page = SourceName::Medijobs.page_url(&base, 2);
        assert_eq!(page.as_str(), "https://www.medijobs.de/jobs?fach=arzt&seite=2");
    }

    #[test]
    fn path_page_urls_append_segment() {
        let base = url("https://www.arztboerse.de/stellen/");
        assert_eq!(SourceName::Arztboerse.page_url(&base, 1), base);
        assert_eq!(
            SourceName::Arztboerse.page_url(&base, 3).as_str(),
            "https://www.arztboerse.de/stellen/seite/3"
        );
    }

    #[test]
    fn aggregator_hosts_match_subdomains() {
        let hosts = SourceName::Medijobs.aggregator_hosts();
        assert!(is_aggregator_host(&url("https://www.medijobs.de/x"), hosts));
        assert!(is_aggregator_host(&url("https://apply.medijobs-apply.de/r/1"), hosts));
        assert!(!is_aggregator_host(&url("https://karriere.klinikum.de/job"), hosts));
        assert!(!is_aggregator_host(&url("https://notmedijobs.de/"), hosts));
    }

    #[test]
    fn resolve_link_skips_non_http() {
        let page = url("https://www.arztboerse.de/stellen");
        assert!(resolve_link(&page, "javascript:void(0)").is_none());
        assert!(resolve_link(&page, "mailto:hr@klinik.de").is_none());
        assert_eq!(
            resolve_link(&page, "/angebot/1").unwrap().as_str(),
            "https://www.arztboerse.de/angebot/1"
        );
    }

    #[test]
    fn window_respects_char_boundaries() {
        let text = "aaÖbb";
        // 'Ö' is two bytes at 2..4
        assert_eq!(window(text, 0, 3), "aa");
        assert_eq!(window(text, 3, 10), "Öbb");
    }
}
