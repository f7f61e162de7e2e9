//! Stellenwerk: result cards carry their fields as `data-*` attributes,
//! including the employer's own application URL when the board knows it.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::resolve_link;
use crate::text::clean_text;
use crate::types::{ScrapedListing, SourceName};

lazy_static! {
    static ref CARD: Selector = Selector::parse("article[data-job-id]").unwrap();
    static ref CARD_LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref CARD_TITLE: Selector = Selector::parse(".card-title, h2, h3").unwrap();
}

pub(super) fn extract(html: &str, page_url: &Url) -> Vec<ScrapedListing> {
    let document = Html::parse_document(html);

    document
        .select(&CARD)
        .filter_map(|card| listing_from_card(card, page_url))
        .collect()
}

fn listing_from_card(card: ElementRef<'_>, page_url: &Url) -> Option<ScrapedListing> {
    let attrs = card.value();
    let job_id = attrs.attr("data-job-id").map(str::trim).filter(|s| !s.is_empty())?;

    let title = card
        .select(&CARD_TITLE)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .or_else(|| attrs.attr("data-title").map(clean_text))
        .filter(|t| !t.is_empty())?;

    let link = card
        .select(&CARD_LINK)
        .find_map(|a| resolve_link(page_url, a.value().attr("href")?))?;

    let pre_resolved_employer_url = attrs
        .attr("data-apply-url")
        .and_then(|href| resolve_link(page_url, href));

    Some(ScrapedListing {
        title,
        external_link: link,
        employer_name: attrs.attr("data-employer").map(clean_text).unwrap_or_default(),
        location_raw: attrs.attr("data-location").map(clean_text).unwrap_or_default(),
        source_unique_id: format!("stellenwerk:{}", job_id),
        pre_resolved_employer_url,
        source_name: SourceName::Stellenwerk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_card_attributes() {
        let html = r#"
            <section>
              <article data-job-id=" 5531 " data-employer="Klinikum Esslingen"
                       data-location="Esslingen am Neckar"
                       data-apply-url="https://jobs.klinikum-esslingen.de/5531">
                <a href="/jobs/5531-oberarzt"><span class="card-title">Oberarzt Kardiologie</span></a>
              </article>
              <article data-job-id="5532" data-title="Weiterbildungsassistent Allgemeinmedizin">
                <a href="/jobs/5532">Details</a>
              </article>
              <article data-job-id=""><a href="/jobs/0"><h2>Broken</h2></a></article>
            </section>
        "#;
        let page = Url::parse("https://www.stellenwerk-medizin.de/jobs?p=1").unwrap();
        let listings = extract(html, &page);

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].source_unique_id, "stellenwerk:5531");
        assert_eq!(listings[0].title, "Oberarzt Kardiologie");
        assert_eq!(listings[0].location_raw, "Esslingen am Neckar");
        assert_eq!(
            listings[0].pre_resolved_employer_url.as_ref().map(Url::as_str),
            Some("https://jobs.klinikum-esslingen.de/5531")
        );
        assert_eq!(listings[1].title, "Weiterbildungsassistent Allgemeinmedizin");
        assert_eq!(
            listings[1].external_link.as_str(),
            "https://www.stellenwerk-medizin.de/jobs/5532"
        );
    }
}
