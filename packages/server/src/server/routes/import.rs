use axum::{body::Bytes, extract::Extension, Json};
use ingest::{RunSummary, SourceName};
use serde::Deserialize;

use crate::common::ApiError;
use crate::server::app::AppState;

/// Optional body of the import trigger. An empty body means all sources.
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ImportRequest {
    fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))
    }

    fn parsed_sources(&self) -> Result<Vec<SourceName>, ApiError> {
        self.sources
            .iter()
            .map(|name| name.parse().map_err(|e: ingest::UnknownSource| ApiError::BadRequest(e.to_string())))
            .collect()
    }
}

/// `POST /api/import/jobs`
///
/// Auth is checked by `require_import_access` before this runs.
pub async fn import_jobs_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<RunSummary>, ApiError> {
    let sources = ImportRequest::from_body(&body)?.parsed_sources()?;
    tracing::info!(sources = ?sources, "Import requested");

    let summary = state.imports.trigger(&sources).await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_all_sources() {
        let request = ImportRequest::from_body(b"  ").unwrap();
        assert!(request.parsed_sources().unwrap().is_empty());
    }

    #[test]
    fn source_names_are_parsed() {
        let request = ImportRequest::from_body(br#"{"sources":["medijobs","Arztboerse"]}"#).unwrap();
        assert_eq!(
            request.parsed_sources().unwrap(),
            [SourceName::Medijobs, SourceName::Arztboerse]
        );
    }

    #[test]
    fn unknown_source_is_a_bad_request() {
        let request = ImportRequest::from_body(br#"{"sources":["monster"]}"#).unwrap();
        assert!(matches!(request.parsed_sources(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        assert!(matches!(ImportRequest::from_body(b"{sources"), Err(ApiError::BadRequest(_))));
    }
}
