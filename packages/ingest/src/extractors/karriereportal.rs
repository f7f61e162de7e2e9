//! Karriereportal: the result list only exists after client-side
//! rendering, so this extractor sees the rendering service's DOM snapshot.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{canonical_id, resolve_link};
use crate::text::clean_text;
use crate::types::{ScrapedListing, SourceName};

pub(super) const CARD_SELECTOR: &str = r#"[data-testid="job-card"]"#;

lazy_static! {
    static ref CARD: Selector = Selector::parse(CARD_SELECTOR).unwrap();
    static ref LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref TITLE: Selector = Selector::parse(r#"[data-testid="job-title"], h3"#).unwrap();
    static ref COMPANY: Selector = Selector::parse(r#"[data-testid="company"]"#).unwrap();
    static ref LOCATION: Selector = Selector::parse(r#"[data-testid="location"]"#).unwrap();
}

pub(super) fn extract(html: &str, page_url: &Url) -> Vec<ScrapedListing> {
    let document = Html::parse_document(html);

    document
        .select(&CARD)
        .filter_map(|card| {
            let title = text_of(card, &TITLE)?;
            let link = card
                .select(&LINK)
                .find_map(|a| resolve_link(page_url, a.value().attr("href")?))?;

            Some(ScrapedListing {
                title,
                source_unique_id: canonical_id(&link),
                external_link: link,
                employer_name: text_of(card, &COMPANY).unwrap_or_default(),
                location_raw: text_of(card, &LOCATION).unwrap_or_default(),
                pre_resolved_employer_url: None,
                source_name: SourceName::Karriereportal,
            })
        })
        .collect()
}

fn text_of(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}
