//! Klinikstellen: anchor-and-heading pairing.
//!
//! Each listing is an anchor to `/stelle/<id>` wrapping an `<h2>`/`<h3>`
//! title. Employer and location live in sibling elements of the nearest
//! enclosing card.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{canonical_id, resolve_link};
use crate::text::clean_text;
use crate::types::{ScrapedListing, SourceName};

/// How many ancestors to climb looking for the card container.
const MAX_CARD_DEPTH: usize = 4;

lazy_static! {
    static ref DETAIL_LINK: Selector = Selector::parse(r#"a[href*="/stelle/"]"#).unwrap();
    static ref HEADING: Selector = Selector::parse("h2, h3").unwrap();
    static ref EMPLOYER: Selector =
        Selector::parse(r#".employer, [itemprop="hiringOrganization"]"#).unwrap();
    static ref LOCATION: Selector =
        Selector::parse(r#".location, [itemprop="jobLocation"]"#).unwrap();
}

pub(super) fn extract(html: &str, page_url: &Url) -> Vec<ScrapedListing> {
    let document = Html::parse_document(html);

    document
        .select(&DETAIL_LINK)
        .filter_map(|anchor| listing_from_anchor(anchor, page_url))
        .collect()
}

fn listing_from_anchor(anchor: ElementRef<'_>, page_url: &Url) -> Option<ScrapedListing> {
    let heading = anchor.select(&HEADING).next()?;
    let title = clean_text(&heading.text().collect::<String>());
    if title.is_empty() {
        return None;
    }

    let link = resolve_link(page_url, anchor.value().attr("href")?)?;
    let card = enclosing_card(anchor);

    let employer_name = card
        .and_then(|c| first_text(c, &EMPLOYER))
        .unwrap_or_default();
    let location_raw = card
        .and_then(|c| first_text(c, &LOCATION))
        .unwrap_or_default();

    Some(ScrapedListing {
        title,
        source_unique_id: canonical_id(&link),
        external_link: link,
        employer_name,
        location_raw,
        pre_resolved_employer_url: None,
        source_name: SourceName::Klinikstellen,
    })
}

/// Nearest ancestor that carries an employer element.
fn enclosing_card(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    anchor
        .ancestors()
        .take(MAX_CARD_DEPTH)
        .filter_map(ElementRef::wrap)
        .find(|el| el.select(&EMPLOYER).next().is_some())
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
}
