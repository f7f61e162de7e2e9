//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! The scheduled import goes through the same [`ImportService`] as the
//! HTTP trigger, so it respects the cooldown and never overlaps a run
//! started over HTTP.

use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::import::{ImportService, TriggerError};

/// Start the periodic import on `schedule` (six-field cron expression)
pub async fn start_scheduler(imports: Arc<ImportService>, schedule: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let import_job = Job::new_async(schedule, move |_uuid, _lock| {
        let imports = imports.clone();
        Box::pin(async move {
            run_scheduled_import(&imports).await;
        })
    })?;

    scheduler.add(import_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule, "Scheduled import started");
    Ok(scheduler)
}

async fn run_scheduled_import(imports: &ImportService) {
    tracing::info!("Running scheduled import");

    match imports.trigger(&[]).await {
        Ok(summary) => tracing::info!(
            imported = summary.imported,
            updated = summary.updated,
            expired = summary.expired,
            errors = summary.errors,
            "Scheduled import complete"
        ),
        Err(e @ (TriggerError::CoolingDown { .. } | TriggerError::AlreadyRunning)) => {
            tracing::info!(reason = %e, "Scheduled import skipped")
        }
        Err(e) => tracing::error!(error = %e, "Scheduled import failed"),
    }
}
