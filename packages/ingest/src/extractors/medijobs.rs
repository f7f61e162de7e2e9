//! Medijobs: structured data only. The visible result list is built
//! client-side from the same JSON-LD, so the blocks are the source of truth.

use url::Url;

use super::{canonical_id, jsonld, resolve_link};
use crate::types::{ScrapedListing, SourceName};

pub(super) fn extract(html: &str, page_url: &Url) -> Vec<ScrapedListing> {
    jsonld::job_postings(html)
        .into_iter()
        .filter(|posting| !posting.title.is_empty())
        .filter_map(|posting| {
            let link = resolve_link(page_url, posting.url.as_deref()?)?;
            Some(ScrapedListing {
                title: posting.title,
                source_unique_id: canonical_id(&link),
                external_link: link,
                employer_name: posting.employer,
                location_raw: posting.location,
                pre_resolved_employer_url: None,
                source_name: SourceName::Medijobs,
            })
        })
        .collect()
}
