//! Run orchestration.
//!
//! A run moves through
//! `Idle → ListingInProgress(chamber)… → [EnrichmentInProgress] → Persisted → Done`.
//!
//! 1. **Preflight**: the output location is checked before any request.
//! 2. **Listing**: every configured chamber's listing page is fetched
//!    (concurrently; the sources are independent) and the records are
//!    appended in configuration order. `ListingInProgress(chamber)` is
//!    entered as that chamber's fetch starts. A chamber that fails
//!    contributes no records and a warning.
//! 3. **Enrichment** (optional): records are enriched one at a time, in
//!    order, each fetch followed by the politeness delay.
//! 4. **Persistence**: the full ordered set is saved exactly once.
//!
//! Only setup problems are fatal. Source and record failures become
//! [`Warning`]s in the [`RunReport`].

use crate::config::{ConfigError, Settings};
use crate::enrich::{EnrichOutcome, Enricher};
use crate::fetch::PageFetcher;
use crate::models::{Chamber, Record};
use crate::outputs::{RecordStore, StoreError};
use crate::scrapers::{ListingAdapter, adapter_for, scrape_listing};
use futures::future::join_all;
use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("output preflight failed: {0}")]
    Output(#[source] StoreError),
    #[error("failed to persist records: {0}")]
    Persist(#[source] StoreError),
}

/// Which chambers to scrape and whether to enrich.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub chambers: Vec<Chamber>,
    pub enrich: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ListingInProgress(Chamber),
    EnrichmentInProgress,
    Persisted,
    Done,
}

/// A contained failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    Source { chamber: Chamber, message: String },
    Record { chamber: Chamber, name: String, message: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Source { chamber, message } => write!(f, "{chamber}: {message}"),
            Warning::Record {
                chamber,
                name,
                message,
            } => write!(f, "{chamber} / {name}: {message}"),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Records in persistence order.
    pub records: Vec<Record>,
    pub warnings: Vec<Warning>,
    /// Records whose detail page was fetched and searched.
    pub enriched: usize,
    /// Optional fields that went from absent to present during enrichment.
    pub fields_filled: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn count(&self, chamber: Chamber) -> usize {
        self.records.iter().filter(|r| r.chamber == chamber).count()
    }

    pub fn with_contact_address(&self) -> usize {
        self.records.iter().filter(|r| r.contact_address.is_some()).count()
    }

    pub fn log_summary(&self) {
        info!(
            total = self.records.len(),
            deputies = self.count(Chamber::Deputies),
            senators = self.count(Chamber::Senate),
            with_contact_address = self.with_contact_address(),
            enriched = self.enriched,
            fields_filled = self.fields_filled,
            warnings = self.warnings.len(),
            secs = self.elapsed.as_secs(),
            millis = self.elapsed.subsec_millis(),
            "Run complete"
        );
        for warning in &self.warnings {
            warn!(%warning, "Contained failure");
        }
    }
}

pub struct Pipeline<F, S> {
    adapters: Vec<Box<dyn ListingAdapter>>,
    enricher: Option<Enricher>,
    fetcher: F,
    store: S,
    listing_timeout: Duration,
    state: Cell<PipelineState>,
}

impl<F: PageFetcher, S: RecordStore> Pipeline<F, S> {
    /// Validate configuration and build one adapter per requested chamber.
    ///
    /// Fails with [`ConfigError::NoSources`] when no chamber is requested.
    pub fn new(settings: &Settings, options: &RunOptions, fetcher: F, store: S) -> Result<Self, PipelineError> {
        if options.chambers.is_empty() {
            return Err(ConfigError::NoSources.into());
        }
        let adapters = options
            .chambers
            .iter()
            .map(|&chamber| adapter_for(chamber, settings))
            .collect::<Result<Vec<_>, _>>()?;
        let enricher = options.enrich.then(|| Enricher::new(settings)).transpose()?;
        Ok(Self {
            adapters,
            enricher,
            fetcher,
            store,
            listing_timeout: settings.listing_timeout(),
            state: Cell::new(PipelineState::Idle),
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn transition(&self, next: PipelineState) {
        info!(from = ?self.state.get(), to = ?next, "Pipeline state change");
        self.state.set(next);
    }

    #[instrument(level = "info", skip_all, fields(sources = self.adapters.len(), enrich = self.enricher.is_some()))]
    pub async fn run(&mut self) -> Result<RunReport, PipelineError> {
        let t0 = Instant::now();
        self.store.prepare().await.map_err(PipelineError::Output)?;

        let mut report = RunReport::default();

        let this = &*self;
        let listings = join_all(this.adapters.iter().map(|adapter| async move {
            let chamber = adapter.chamber();
            this.transition(PipelineState::ListingInProgress(chamber));
            let listing = scrape_listing(&this.fetcher, adapter.as_ref(), this.listing_timeout).await;
            (chamber, listing)
        }))
        .await;

        for (chamber, listing) in listings {
            match listing {
                Ok(records) => {
                    info!(%chamber, count = records.len(), "Added chamber records");
                    report.records.extend(records);
                }
                Err(e) => {
                    warn!(%chamber, error = %e, "Chamber scrape failed; continuing with remaining sources");
                    report.warnings.push(Warning::Source {
                        chamber,
                        message: e.to_string(),
                    });
                }
            }
        }

        if self.enricher.is_some() && !report.records.is_empty() {
            self.transition(PipelineState::EnrichmentInProgress);
        }
        if let Some(enricher) = self.enricher.as_ref() {
            let total = report.records.len();
            for (i, record) in report.records.iter_mut().enumerate() {
                info!(index = i + 1, total, name = %record.name, "Scraping member details");
                match enricher.enrich(&self.fetcher, record).await {
                    EnrichOutcome::Enriched { filled } => {
                        report.enriched += 1;
                        report.fields_filled += filled;
                    }
                    EnrichOutcome::Skipped => {}
                    EnrichOutcome::Failed { reason } => report.warnings.push(Warning::Record {
                        chamber: record.chamber,
                        name: record.name.clone(),
                        message: reason,
                    }),
                }
            }
        }

        if let Err(e) = self.store.save(&report.records).await {
            error!(error = %e, "Failed to persist records");
            return Err(PipelineError::Persist(e));
        }
        self.transition(PipelineState::Persisted);

        report.elapsed = t0.elapsed();
        self.transition(PipelineState::Done);
        Ok(report)
    }
}
