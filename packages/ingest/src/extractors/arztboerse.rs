//! Arztboerse: local-context field scanning.
//!
//! The result list has no stable container markup, only a detail link per
//! listing followed by loosely structured fields. Fields are read from a
//! bounded window after each link, cut off at the next detail link so one
//! listing never borrows another's employer.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::{canonical_id, resolve_link, window};
use crate::text::strip_tags;
use crate::types::{ScrapedListing, SourceName};

/// Bytes scanned after a detail link.
const CONTEXT_WINDOW: usize = 1500;

lazy_static! {
    static ref DETAIL_LINK: Regex =
        Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*["']([^"']*/angebot/[^"'#]+)["'][^>]*>(.*?)</a>"#)
            .unwrap();
    static ref EMPLOYER: Regex =
        Regex::new(r#"(?is)class\s*=\s*["'][^"']*\barbeitgeber\b[^"']*["'][^>]*>(.*?)</"#).unwrap();
    static ref LOCATION: Regex =
        Regex::new(r#"(?is)class\s*=\s*["'][^"']*\b(?:einsatzort|ort)\b[^"']*["'][^>]*>(.*?)</"#)
            .unwrap();
    static ref EMPLOYER_URL: Regex =
        Regex::new(r#"(?i)data-employer-url\s*=\s*["'](https?://[^"']+)["']"#).unwrap();
}

pub(super) fn extract(html: &str, page_url: &Url) -> Vec<ScrapedListing> {
    let matches: Vec<_> = DETAIL_LINK.captures_iter(html).collect();
    let mut listings = Vec::with_capacity(matches.len());

    for (i, cap) in matches.iter().enumerate() {
        let Some(link) = resolve_link(page_url, &cap[1]) else {
            continue;
        };
        let title = strip_tags(&cap[2]);
        if title.is_empty() {
            continue;
        }

        let whole = cap.get(0).map(|m| m.end()).unwrap_or(0);
        let next_link = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(html.len());
        let context = window(html, whole, CONTEXT_WINDOW.min(next_link.saturating_sub(whole)));

        let employer_name = first_capture(&EMPLOYER, context).unwrap_or_default();
        let location_raw = first_capture(&LOCATION, context).unwrap_or_default();
        let pre_resolved_employer_url = EMPLOYER_URL
            .captures(context)
            .and_then(|c| Url::parse(&html_escape::decode_html_entities(&c[1])).ok());

        listings.push(ScrapedListing {
            title,
            source_unique_id: canonical_id(&link),
            external_link: link,
            employer_name,
            location_raw,
            pre_resolved_employer_url,
            source_name: SourceName::Arztboerse,
        });
    }

    listings
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .map(|c| strip_tags(&c[1]))
        .filter(|s| !s.is_empty())
}
