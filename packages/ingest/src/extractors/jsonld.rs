//! schema.org `JobPosting` blocks embedded as JSON-LD.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::text::clean_text;

lazy_static! {
    static ref LD_JSON_BLOCK: Regex = Regex::new(
        r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#
    )
    .unwrap();
}

/// Fields of one `JobPosting` that the extractors care about.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct JobPosting {
    pub title: String,
    pub url: Option<String>,
    pub employer: String,
    pub location: String,
}

/// Every `JobPosting` found in the page's JSON-LD blocks, in document order.
/// Blocks that fail to parse are skipped.
pub(super) fn job_postings(html: &str) -> Vec<JobPosting> {
    let mut postings = Vec::new();
    for cap in LD_JSON_BLOCK.captures_iter(html) {
        let Ok(value) = serde_json::from_str::<Value>(cap[1].trim()) else {
            tracing::debug!("Skipping unparsable JSON-LD block");
            continue;
        };
        collect(&value, &mut postings);
    }
    postings
}

fn collect(value: &Value, out: &mut Vec<JobPosting>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        Value::Object(map) => {
            if is_job_posting(value) {
                out.push(parse_posting(value));
                return;
            }
            for key in ["@graph", "itemListElement", "item", "mainEntity"] {
                if let Some(nested) = map.get(key) {
                    collect(nested, out);
                }
            }
        }
        _ => {}
    }
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "JobPosting",
        Some(Value::Array(types)) => types.iter().any(|t| t == "JobPosting"),
        _ => false,
    }
}

fn parse_posting(value: &Value) -> JobPosting {
    let title = text_field(value.get("title")).unwrap_or_default();
    let url = text_field(value.get("url"));
    let employer = value
        .get("hiringOrganization")
        .and_then(|org| match org {
            Value::Object(_) => text_field(org.get("name")),
            other => text_field(Some(other)),
        })
        .unwrap_or_default();

    JobPosting {
        title,
        url,
        employer,
        location: location_text(value.get("jobLocation")),
    }
}

/// `jobLocation` may be one place or a list; the first usable one wins.
fn location_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(places)) => places
            .iter()
            .map(|place| location_text(Some(place)))
            .find(|text| !text.is_empty())
            .unwrap_or_default(),
        Some(place @ Value::Object(_)) => match place.get("address") {
            Some(address @ Value::Object(_)) => {
                let parts: Vec<String> = ["postalCode", "addressLocality"]
                    .iter()
                    .filter_map(|key| text_field(address.get(*key)))
                    .collect();
                parts.join(" ")
            }
            other => text_field(other).unwrap_or_default(),
        },
        other => text_field(other).unwrap_or_default(),
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => clean_text(s),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
