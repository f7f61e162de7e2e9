//! Import triggering: the cooldown and single-run guard in front of the
//! orchestrator. Both the HTTP route and the scheduler go through here.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ingest::{Clock, IngestError, ListingStore, Orchestrator, RunSummary, SourceName, StoreError, SystemClock};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("last import at {last_import} is within the cooldown")]
    CoolingDown {
        last_import: DateTime<Utc>,
        retry_after: Duration,
    },

    #[error("an import run is already in progress")]
    AlreadyRunning,

    #[error("cooldown check failed: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Run(#[from] IngestError),
}

pub struct ImportService {
    orchestrator: Orchestrator,
    store: Arc<dyn ListingStore>,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
    running: Mutex<()>,
}

impl ImportService {
    pub fn new(orchestrator: Orchestrator, store: Arc<dyn ListingStore>, cooldown: Duration) -> Self {
        Self {
            orchestrator,
            store,
            cooldown,
            clock: Arc::new(SystemClock),
            running: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    /// Run one import unless another one is in flight or the last one
    /// inserted listings less than the cooldown ago.
    pub async fn trigger(&self, sources: &[SourceName]) -> Result<RunSummary, TriggerError> {
        let _guard = self.running.try_lock().map_err(|_| TriggerError::AlreadyRunning)?;

        if let Some(last_import) = self.store.last_import_at().await? {
            let since = self.clock.now() - last_import;
            if since < self.cooldown {
                info!(%last_import, "Import skipped, still cooling down");
                return Err(TriggerError::CoolingDown {
                    last_import,
                    retry_after: self.cooldown - since,
                });
            }
        }

        Ok(self.orchestrator.run(sources).await?)
    }
}
