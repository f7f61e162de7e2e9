//! Wiring of the import pipeline from the server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ingest::{
    Classifier, HttpFetcher, IngestConfig, ListingStore, OpenAiClassifier, Orchestrator, RenderingFetcher,
};

use crate::domains::import::ImportService;
use crate::Config;

/// Per-run tunables from the environment; the rest keeps its defaults.
pub fn ingest_config(config: &Config) -> IngestConfig {
    IngestConfig::default()
        .with_grace_window(Duration::from_secs(config.import_grace_hours * 60 * 60))
        .with_execution_budget(Duration::from_secs(config.import_budget_seconds))
}

pub fn build_import_service(config: &Config, store: Arc<dyn ListingStore>) -> Result<ImportService> {
    let ingest_config = ingest_config(config);
    let fetcher = HttpFetcher::new(&ingest_config).context("Failed to build HTTP fetcher")?;

    let classifier = match &config.openai_api_key {
        Some(key) => {
            let model = OpenAiClassifier::new(key.clone())
                .context("Failed to build classifier client")?
                .with_model(config.openai_model.clone());
            tracing::info!(model = %model.model(), "Model classification enabled");
            Classifier::with_model(Arc::new(model))
        }
        None => {
            tracing::info!("OPENAI_API_KEY not set, classifying with keyword rules only");
            Classifier::rules_only()
        }
    };

    let page_timeout = ingest_config.request_timeout;
    let mut orchestrator =
        Orchestrator::new(store.clone(), Arc::new(fetcher), ingest_config).with_classifier(classifier);

    match &config.render_service_url {
        Some(url) => {
            let renderer = RenderingFetcher::new(url, page_timeout).context("Invalid RENDER_SERVICE_URL")?;
            orchestrator = orchestrator.with_rendering_service(renderer);
            tracing::info!(url = %url, "Rendering service configured");
        }
        None => tracing::warn!("RENDER_SERVICE_URL not set, rendered sources will be skipped"),
    }

    Ok(ImportService::new(
        orchestrator,
        store,
        chrono::Duration::minutes(config.import_cooldown_minutes),
    ))
}
