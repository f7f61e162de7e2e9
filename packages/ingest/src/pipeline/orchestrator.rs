//! One import run: crawl every requested source, reconcile the scraped
//! listings against the store, expire what went missing.
//!
//! Sources are crawled concurrently; reconciliation is strictly
//! sequential so the budget check stays a single counter and outbound
//! calls stay rate-limited. A failing listing is counted and logged and
//! the loop moves on.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::budget::{Clock, RunBudget, SystemClock};
use super::lifecycle;
use crate::classify::{Classification, ClassificationSignal, Classifier};
use crate::config::IngestConfig;
use crate::crawler::{CrawlOutcome, SourceCrawler};
use crate::error::{IngestError, Result, StoreError};
use crate::extractors::is_aggregator_host;
use crate::fetch::RenderingFetcher;
use crate::links::{EmployerLinkResolver, LinkResolution};
use crate::location::LocationResolver;
use crate::traits::{ListingStore, PageFetcher};
use crate::types::{
    ImportStatus, JobId, JobRecord, NewJobRecord, RunAction, RunId, RunLogEntry, RunSummary, ScrapedListing,
    SourceName,
};

/// What happened to one scraped listing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemOutcome {
    Imported {
        job_id: JobId,
        signal: ClassificationSignal,
    },
    Updated(JobId),
    Skipped {
        job_id: Option<JobId>,
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    Unchanged,
    /// Unchanged, and region or employer URL were backfilled
    Backfilled,
    /// A published listing already has this apply URL
    DuplicateOfPublished,
    /// The store already had the unique id
    Duplicate,
}

impl SkipReason {
    fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Unchanged => "unchanged",
            SkipReason::Backfilled => "backfilled",
            SkipReason::DuplicateOfPublished => "duplicate_of_published",
            SkipReason::Duplicate => "duplicate",
        }
    }
}

struct ItemFailure {
    job_id: Option<JobId>,
    error: StoreError,
}

impl From<StoreError> for ItemFailure {
    fn from(error: StoreError) -> Self {
        Self {
            job_id: None,
            error,
        }
    }
}

/// Enrichment computed for a new or changed listing.
struct Enrichment {
    apply_url: String,
    location: String,
    classification: Classification,
}

pub struct Orchestrator {
    store: Arc<dyn ListingStore>,
    fetcher: Arc<dyn PageFetcher>,
    source_fetchers: HashMap<SourceName, Arc<dyn PageFetcher>>,
    links: EmployerLinkResolver,
    classifier: Classifier,
    locations: LocationResolver,
    clock: Arc<dyn Clock>,
    config: IngestConfig,
}

impl Orchestrator {
    /// `fetcher` serves result pages and employer-link hops. Sources that
    /// need rendering are skipped until a rendering service is added.
    pub fn new(store: Arc<dyn ListingStore>, fetcher: Arc<dyn PageFetcher>, config: IngestConfig) -> Self {
        Self {
            links: EmployerLinkResolver::new(fetcher.clone(), config.hop_limit),
            store,
            fetcher,
            source_fetchers: HashMap::new(),
            classifier: Classifier::rules_only(),
            locations: LocationResolver::default(),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_location_resolver(mut self, locations: LocationResolver) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Route every source that needs rendering through `renderer`.
    pub fn with_rendering_service(mut self, renderer: RenderingFetcher) -> Self {
        for source in SourceName::ALL.into_iter().filter(|s| s.requires_rendering()) {
            let fetcher = renderer.clone().with_wait_for_selector(source.wait_for_selector());
            self.source_fetchers.insert(source, Arc::new(fetcher));
        }
        self
    }

    /// Use a dedicated fetcher for the result pages of one source.
    pub fn with_source_fetcher(mut self, source: SourceName, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.source_fetchers.insert(source, fetcher);
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    fn page_fetcher(&self, source: SourceName) -> Option<Arc<dyn PageFetcher>> {
        match self.source_fetchers.get(&source) {
            Some(fetcher) => Some(fetcher.clone()),
            None if source.requires_rendering() => None,
            None => Some(self.fetcher.clone()),
        }
    }

    /// Run one import over `sources` (all sources when empty).
    ///
    /// Returns `Err` only if the run could not start: the run log could
    /// not be opened or the known listings could not be loaded. Everything
    /// after that is reported in the summary.
    pub async fn run(&self, sources: &[SourceName]) -> Result<RunSummary> {
        let sources = requested_sources(sources);
        let run_id = RunId::new();
        let mut budget = RunBudget::start(
            self.clock.now(),
            self.config.execution_budget,
            self.config.backfill_limit,
        );

        info!(run_id = %run_id, sources = ?sources, "Import run starting");

        let source_names: Vec<&str> = sources.iter().map(SourceName::as_str).collect();
        self.store
            .append_log(
                RunLogEntry::new(run_id, RunAction::RunStarted, budget.started_at())
                    .with_detail("sources", source_names),
            )
            .await
            .map_err(IngestError::RunLog)?;

        let existing = self
            .store
            .find_by_sources(&sources)
            .await
            .map_err(IngestError::LoadExisting)?;
        debug!(run_id = %run_id, count = existing.len(), "Loaded known listings");

        let mut summary = RunSummary {
            run_id: Some(run_id),
            ..RunSummary::default()
        };

        let outcomes = self.crawl_all(&sources, &mut summary).await;
        let listings: Vec<&ScrapedListing> = outcomes.iter().flat_map(|o| o.listings.iter()).collect();
        summary.total_listings = listings.len();

        let mut known: HashMap<(SourceName, String), JobRecord> = existing
            .into_iter()
            .map(|r| ((r.source_name, r.source_unique_id.clone()), r))
            .collect();

        for (index, listing) in listings.iter().enumerate() {
            let now = self.clock.now();
            if budget.is_exhausted(now) {
                summary.budget_exhausted = true;
                summary.unprocessed = listings.len() - index;
                warn!(
                    run_id = %run_id,
                    processed = index,
                    remaining = summary.unprocessed,
                    "Execution budget exhausted, leaving listings for the next run"
                );
                break;
            }

            if index > 0 && !self.config.item_delay.is_zero() {
                tokio::time::sleep(self.config.item_delay).await;
            }

            let key = (listing.source_name, listing.source_unique_id.clone());
            let result = match known.get_mut(&key) {
                Some(record) => self.reconcile_known(listing, record, &mut budget).await,
                None => self.import_new(listing).await,
            };
            self.record_item(run_id, listing, result, &mut summary).await;
        }

        self.expire_unseen(run_id, &outcomes, &known, &mut summary).await;

        summary.success = true;
        let completed = RunLogEntry::new(run_id, RunAction::RunCompleted, self.clock.now())
            .with_detail("summary", serde_json::to_value(&summary).unwrap_or_default());
        if let Err(e) = self.store.append_log(completed).await {
            warn!(run_id = %run_id, error = %e, "Failed to write run-completed log");
            summary.error_messages.push(format!("run log: {}", e));
        }

        info!(
            run_id = %run_id,
            total = summary.total_listings,
            imported = summary.imported,
            updated = summary.updated,
            skipped = summary.skipped,
            expired = summary.expired,
            errors = summary.errors,
            budget_exhausted = summary.budget_exhausted,
            "Import run finished"
        );
        Ok(summary)
    }

    async fn crawl_all(&self, sources: &[SourceName], summary: &mut RunSummary) -> Vec<CrawlOutcome> {
        let mut crawls = Vec::new();
        for &source in sources {
            let Some(fetcher) = self.page_fetcher(source) else {
                warn!(source = %source, "No rendering service configured, skipping source");
                summary
                    .error_messages
                    .push(format!("{}: rendering service not configured, source skipped", source));
                continue;
            };
            let base = match self.config.base_url(source) {
                Ok(base) => base,
                Err(e) => {
                    summary.error_messages.push(format!("{}: {}", source, e));
                    continue;
                }
            };
            let max_pages = self.config.max_pages;
            let page_delay = self.config.page_delay;
            crawls.push(async move {
                SourceCrawler::new(fetcher.as_ref(), max_pages, page_delay)
                    .crawl(source, &base)
                    .await
            });
        }

        let outcomes = join_all(crawls).await;
        for outcome in &outcomes {
            if outcome.stop.is_failure() {
                summary
                    .error_messages
                    .push(format!("{}: pagination stopped: {:?}", outcome.source, outcome.stop));
            }
        }
        outcomes
    }

    async fn import_new(&self, listing: &ScrapedListing) -> std::result::Result<ItemOutcome, ItemFailure> {
        let enrichment = self.enrich(listing).await;

        if let Some(published) = self
            .store
            .find_published_by_apply_url(&enrichment.apply_url)
            .await?
        {
            return Ok(ItemOutcome::Skipped {
                job_id: Some(published.id),
                reason: SkipReason::DuplicateOfPublished,
            });
        }

        let new = NewJobRecord {
            title: listing.title.clone(),
            hospital_name: listing.employer_name.clone(),
            location: enrichment.location,
            department: enrichment.classification.department.clone(),
            tags: enrichment.classification.tags.clone(),
            description: enrichment.classification.description.clone(),
            apply_url: enrichment.apply_url,
            source_url: listing.external_link.to_string(),
            source_name: listing.source_name,
            source_unique_id: listing.source_unique_id.clone(),
            content_hash: listing.content_hash(),
            import_status: lifecycle::on_insert(),
            seen_at: self.clock.now(),
        };

        let mut record = match self.store.insert_listing(new).await {
            Ok(record) => record,
            Err(StoreError::Duplicate { .. }) => {
                return Ok(ItemOutcome::Skipped {
                    job_id: None,
                    reason: SkipReason::Duplicate,
                })
            }
            Err(e) => return Err(e.into()),
        };

        record.import_status = lifecycle::classify(&enrichment.classification);
        if let Err(error) = self.store.update_listing(&record).await {
            self.mark_failed(&mut record).await;
            return Err(ItemFailure {
                job_id: Some(record.id),
                error,
            });
        }
        Ok(ItemOutcome::Imported {
            job_id: record.id,
            signal: enrichment.classification.signal,
        })
    }

    async fn reconcile_known(
        &self,
        listing: &ScrapedListing,
        record: &mut JobRecord,
        budget: &mut RunBudget,
    ) -> std::result::Result<ItemOutcome, ItemFailure> {
        let hash = listing.content_hash();
        let changed = hash != record.content_hash;
        let revived = record.import_status == ImportStatus::Expired && !record.is_published;
        record.last_seen_at = self.clock.now();

        let outcome = if changed || revived {
            let enrichment = self.enrich(listing).await;
            record.title = listing.title.clone();
            record.hospital_name = listing.employer_name.clone();
            record.location = enrichment.location;
            record.department = enrichment.classification.department.clone();
            record.tags = enrichment.classification.tags.clone();
            record.description = enrichment.classification.description.clone();
            record.apply_url = enrichment.apply_url;
            record.source_url = listing.external_link.to_string();
            record.content_hash = hash;
            lifecycle::reclassify(record, &enrichment.classification);
            ItemOutcome::Updated(record.id)
        } else {
            let reason = if self.backfill(listing, record, budget).await {
                SkipReason::Backfilled
            } else {
                SkipReason::Unchanged
            };
            ItemOutcome::Skipped {
                job_id: Some(record.id),
                reason,
            }
        };

        if let Err(error) = self.store.update_listing(record).await {
            self.mark_failed(record).await;
            return Err(ItemFailure {
                job_id: Some(record.id),
                error,
            });
        }
        Ok(outcome)
    }

    /// Opportunistic region and employer-URL backfill for an unchanged
    /// listing. Each backfilled listing takes one slot from the budget.
    async fn backfill(&self, listing: &ScrapedListing, record: &mut JobRecord, budget: &mut RunBudget) -> bool {
        let hosts = listing.source_name.aggregator_hosts();
        let needs_region = !record.location.trim().is_empty() && !self.locations.has_region(&record.location);
        let stored_apply = Url::parse(&record.apply_url).ok();
        let needs_link = stored_apply
            .as_ref()
            .is_some_and(|url| is_aggregator_host(url, hosts));

        if !(needs_region || needs_link) || !budget.take_backfill() {
            return false;
        }

        let mut changed = false;
        if needs_region {
            let enriched = self.locations.enrich(&record.location);
            changed |= enriched != record.location;
            record.location = enriched;
        }
        if let (true, Some(start)) = (needs_link, stored_apply) {
            if let LinkResolution::Resolved(url) = self.links.resolve(&start, hosts).await {
                record.apply_url = url.to_string();
                changed = true;
            }
        }
        debug!(
            source = %listing.source_name,
            id = %listing.source_unique_id,
            changed,
            "Backfilled unchanged listing"
        );
        changed
    }

    async fn enrich(&self, listing: &ScrapedListing) -> Enrichment {
        let apply_url = self.resolve_apply_url(listing).await;
        let location = self.locations.enrich(&listing.location_raw);
        let classification = self
            .classifier
            .classify(
                &listing.title,
                Some(listing.employer_name.as_str()),
                Some(location.as_str()),
            )
            .await;
        Enrichment {
            apply_url,
            location,
            classification,
        }
    }

    /// Employer URL when it can be found, else the board's detail URL.
    async fn resolve_apply_url(&self, listing: &ScrapedListing) -> String {
        let hosts = listing.source_name.aggregator_hosts();
        if let Some(url) = listing
            .pre_resolved_employer_url
            .as_ref()
            .filter(|url| !is_aggregator_host(url, hosts))
        {
            return url.to_string();
        }

        let start = listing
            .pre_resolved_employer_url
            .as_ref()
            .unwrap_or(&listing.external_link);
        match self.links.resolve(start, hosts).await {
            LinkResolution::Resolved(url) => url.to_string(),
            LinkResolution::NotResolved { reason } => {
                debug!(
                    source = %listing.source_name,
                    url = %start,
                    reason = %reason,
                    "Employer link not resolved, keeping detail URL"
                );
                listing.external_link.to_string()
            }
        }
    }

    async fn mark_failed(&self, record: &mut JobRecord) {
        lifecycle::fail(record);
        if let Err(e) = self.store.update_listing(record).await {
            debug!(job_id = %record.id, error = %e, "Could not mark listing as failed");
        }
    }

    async fn record_item(
        &self,
        run_id: RunId,
        listing: &ScrapedListing,
        result: std::result::Result<ItemOutcome, ItemFailure>,
        summary: &mut RunSummary,
    ) {
        let now = self.clock.now();
        let base = |action| {
            RunLogEntry::new(run_id, action, now)
                .with_listing(listing.source_unique_id.clone())
                .with_detail("source", listing.source_name.as_str())
                .with_detail("title", listing.title.clone())
        };

        let entry = match result {
            Ok(ItemOutcome::Imported { job_id, signal }) => {
                summary.imported += 1;
                base(RunAction::Imported)
                    .with_job(job_id)
                    .with_detail("classified_by", signal.as_str())
            }
            Ok(ItemOutcome::Updated(id)) => {
                summary.updated += 1;
                base(RunAction::Updated).with_job(id)
            }
            Ok(ItemOutcome::Skipped { job_id, reason }) => {
                summary.skipped += 1;
                let entry = base(RunAction::Skipped).with_detail("reason", reason.as_str());
                match job_id {
                    Some(id) => entry.with_job(id),
                    None => entry,
                }
            }
            Err(failure) => {
                summary.errors += 1;
                error!(
                    run_id = %run_id,
                    source = %listing.source_name,
                    title = %listing.title,
                    error = %failure.error,
                    "Listing failed"
                );
                summary.error_messages.push(format!(
                    "{} ({}): {}",
                    listing.title, listing.source_name, failure.error
                ));
                let entry = base(RunAction::Error).with_detail("error", failure.error.to_string());
                match failure.job_id {
                    Some(id) => entry.with_job(id),
                    None => entry,
                }
            }
        };

        if let Err(e) = self.store.append_log(entry).await {
            warn!(run_id = %run_id, error = %e, "Failed to write run log entry");
        }
    }

    /// Expire review-queue listings that a fully crawled source no longer
    /// lists. Sources whose crawl failed or came back empty are left
    /// alone, since their missing listings may only be a scrape miss.
    async fn expire_unseen(
        &self,
        run_id: RunId,
        outcomes: &[CrawlOutcome],
        known: &HashMap<(SourceName, String), JobRecord>,
        summary: &mut RunSummary,
    ) {
        let now = self.clock.now();
        let grace = self.config.grace_window_chrono();

        for outcome in outcomes.iter().filter(|o| o.is_complete()) {
            let seen: HashSet<&str> = outcome
                .listings
                .iter()
                .map(|l| l.source_unique_id.as_str())
                .collect();

            let mut candidates: Vec<&JobRecord> = known
                .values()
                .filter(|r| r.source_name == outcome.source)
                .filter(|r| !seen.contains(r.source_unique_id.as_str()))
                .filter(|r| lifecycle::should_expire(r, now, grace))
                .collect();
            candidates.sort_by(|a, b| a.source_unique_id.cmp(&b.source_unique_id));

            for record in candidates {
                let mut record = record.clone();
                lifecycle::expire(&mut record);

                let entry = RunLogEntry::new(run_id, RunAction::Expired, now)
                    .with_listing(record.source_unique_id.clone())
                    .with_job(record.id)
                    .with_detail("source", record.source_name.as_str());

                match self.store.update_listing(&record).await {
                    Ok(()) => {
                        summary.expired += 1;
                        if let Err(e) = self.store.append_log(entry).await {
                            warn!(run_id = %run_id, error = %e, "Failed to write run log entry");
                        }
                    }
                    Err(e) => {
                        summary.errors += 1;
                        error!(run_id = %run_id, job_id = %record.id, error = %e, "Expiry failed");
                        summary
                            .error_messages
                            .push(format!("{} ({}): expiry failed: {}", record.title, record.source_name, e));
                    }
                }
            }
        }
    }
}

/// Deduplicated, in declaration order; all sources for an empty request.
fn requested_sources(requested: &[SourceName]) -> Vec<SourceName> {
    if requested.is_empty() {
        return SourceName::ALL.to_vec();
    }
    SourceName::ALL
        .into_iter()
        .filter(|s| requested.contains(s))
        .collect()
}
