//! Seller iteration engine.
//!
//! One seller at a time: filter the listing down to a single seller facet,
//! open the first product in an auxiliary context, extract the seller's
//! contact data and commit exactly one record before moving the cursor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use harvest_checkpoint::ResumeStore;
use harvest_protocols::{SellerFacet, SellerRecord, UiProbe};

use crate::error::EngineError;
use crate::extractor::ContextExtractor;
use crate::options::EngineOptions;
use crate::oracle::PollingOracle;
use crate::panel::PanelOpener;
use crate::state::EngineState;

/// Facet enumeration polls the panel this often, ten samples at most.
const FACET_POLL_INTERVAL: Duration = Duration::from_millis(500);
const FACET_POLL_WINDOW: Duration = Duration::from_millis(4_500);

/// Counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_sellers: usize,
    /// Cursor the run resumed from.
    pub start_cursor: usize,
    pub processed: usize,
    pub found: usize,
    pub not_found: usize,
    /// Listing page lost and neither history back nor reload brought it back.
    pub recovery_failures: usize,
    /// Seller panel could not be reopened between sellers, even after a reload.
    pub panel_failures: usize,
}

impl RunSummary {
    fn record(&mut self, record: &SellerRecord) {
        self.processed += 1;
        if record.is_found() {
            self.found += 1;
        } else {
            self.not_found += 1;
        }
    }
}

/// How a run ended, when it did not end fatally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every seller processed; the cursor was reset to 0.
    Completed { summary: RunSummary },
    /// Stopped on request; `cursor` is the next seller to process.
    Aborted { cursor: usize, summary: RunSummary },
}

impl RunOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Completed { summary } | RunOutcome::Aborted { summary, .. } => summary,
        }
    }
}

/// Clears the active flag when a run ends, however it ends.
struct ActiveGuard<'a>(&'a AtomicBool);

impl<'a> ActiveGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The resumable seller iteration state machine.
pub struct SellerEngine {
    pub(crate) probe: Arc<dyn UiProbe>,
    pub(crate) store: ResumeStore,
    pub(crate) options: Arc<EngineOptions>,
    pub(crate) oracle: PollingOracle,
    pub(crate) panel: PanelOpener,
    pub(crate) extractor: ContextExtractor,
    state: AtomicU8,
    active: AtomicBool,
}

impl SellerEngine {
    pub fn new(probe: Arc<dyn UiProbe>, store: ResumeStore, options: EngineOptions) -> Self {
        let options = Arc::new(options);
        Self {
            panel: PanelOpener::new(probe.clone(), options.clone()),
            extractor: ContextExtractor::new(options.clone()),
            oracle: PollingOracle::new(options.poll_interval()),
            probe,
            store,
            options,
            state: AtomicU8::new(EngineState::Idle as u8),
            active: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState::from(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_state(&self, state: EngineState) {
        let previous = EngineState::from(self.state.swap(state as u8, Ordering::SeqCst));
        if previous != state {
            debug!("Engine state: {} -> {}", previous, state);
        }
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &ResumeStore {
        &self.store
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Run from the persisted cursor until every seller is processed or
    /// `cancel` fires.
    ///
    /// A second call while a run is active fails with
    /// [`EngineError::AlreadyRunning`] and changes nothing.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunOutcome, EngineError> {
        let Some(_active) = ActiveGuard::acquire(&self.active) else {
            warn!("Seller iteration already running, start request ignored");
            return Err(EngineError::AlreadyRunning);
        };

        let result = self.run_inner(&cancel).await;

        match &result {
            Ok(RunOutcome::Completed { .. }) => self.set_state(EngineState::Completed),
            Ok(RunOutcome::Aborted { .. }) => self.set_state(EngineState::Aborted),
            Err(e) => {
                error!("Seller iteration failed: {}", e);
                self.set_state(EngineState::Fatal);
            }
        }

        result
    }

    async fn run_inner(&self, cancel: &CancellationToken) -> Result<RunOutcome, EngineError> {
        self.set_state(EngineState::Opening);
        info!("Starting seller iteration");

        if !self.panel.open(cancel).await {
            if cancel.is_cancelled() {
                let cursor = self.store.try_cursor().await?;
                info!(cursor, "Stopped before the seller panel opened");
                return Ok(RunOutcome::Aborted {
                    cursor,
                    summary: RunSummary::default(),
                });
            }
            return Err(EngineError::PanelUnavailable {
                attempts: self.options.retry.panel_max_retries,
            });
        }

        self.capture_context().await?;

        let facets = self.enumerate_facets().await;
        self.store.save_total_sellers(facets.len()).await?;
        if facets.is_empty() {
            return Err(EngineError::NoSellers);
        }

        let total = facets.len();
        let mut cursor = self.store.try_cursor().await?;
        if cursor > total {
            warn!(cursor, total, "Stored cursor beyond seller count, starting over");
            cursor = 0;
            self.store.save_cursor(0).await?;
        }

        // Every commit rewrites the whole list, so a list we cannot read must
        // stop the run rather than be replaced.
        let mut records = self.store.try_records().await?;
        let mut summary = RunSummary {
            total_sellers: total,
            start_cursor: cursor,
            ..Default::default()
        };
        info!(total, cursor, existing_records = records.len(), "Seller facets ready");

        for (index, facet) in facets.iter().enumerate().skip(cursor) {
            if cancel.is_cancelled() {
                info!(cursor = index, "Stop requested, seller iteration aborted");
                log_records(&records);
                return Ok(RunOutcome::Aborted {
                    cursor: index,
                    summary,
                });
            }

            self.set_state(EngineState::PerSellerActive);
            let display_index = index + 1;
            info!(seller = %facet.id, "Processing seller {}/{}", display_index, total);

            let record = self.process_guarded(facet, display_index, cancel).await;
            info!(seller = %facet.id, email = %record.email, "Seller {}/{} done", display_index, total);

            summary.record(&record);
            records.push(record);
            self.store
                .commit_seller(&records, display_index, &facet.id)
                .await?;

            self.set_state(EngineState::Advancing);
            if display_index < total && !cancel.is_cancelled() {
                self.prepare_next(&mut summary, cancel).await;
            }
        }

        self.store.reset_progress().await?;
        log_records(&records);
        info!(
            processed = summary.processed,
            found = summary.found,
            not_found = summary.not_found,
            "All sellers processed"
        );

        Ok(RunOutcome::Completed { summary })
    }

    /// Persist the category heading and breadcrumb trail of the listing.
    async fn capture_context(&self) -> Result<(), EngineError> {
        let category = self.probe.category_name().await.unwrap_or_else(|e| {
            debug!("Category name unavailable: {}", e);
            None
        });
        let breadcrumbs = self.probe.breadcrumbs().await.unwrap_or_else(|e| {
            debug!("Breadcrumbs unavailable: {}", e);
            Vec::new()
        });

        info!(
            category = category.as_deref().unwrap_or("-"),
            breadcrumbs = breadcrumbs.len(),
            "Listing context captured"
        );
        self.store.save_category_name(category.as_deref()).await?;
        self.store.save_breadcrumbs(&breadcrumbs).await?;
        Ok(())
    }

    /// Selectable seller facets in document order.
    async fn enumerate_facets(&self) -> Vec<SellerFacet> {
        let settle = PollingOracle::new(FACET_POLL_INTERVAL);
        if !settle
            .seller_panel_open(self.probe.as_ref(), FACET_POLL_WINDOW)
            .await
        {
            warn!("Seller facets did not render");
        }
        tokio::time::sleep(FACET_POLL_INTERVAL).await;

        let controls = match self.probe.facet_controls().await {
            Ok(controls) => controls,
            Err(e) => {
                warn!("Failed to read seller facets: {}", e);
                return Vec::new();
            }
        };

        let marker = &self.options.out_of_stock_marker;
        let mut out_of_stock = 0;
        let mut disabled = 0;
        let facets: Vec<SellerFacet> = controls
            .iter()
            .map(|control| SellerFacet::from_control(control, marker))
            .filter(|facet| {
                if !facet.is_selectable {
                    if SellerFacet::is_out_of_stock(&facet.id, marker) {
                        out_of_stock += 1;
                    } else {
                        disabled += 1;
                    }
                }
                facet.is_selectable
            })
            .collect();

        info!(
            selectable = facets.len(),
            out_of_stock, disabled, "Seller facets enumerated"
        );
        facets
    }
}

fn log_records(records: &[SellerRecord]) {
    match serde_json::to_string_pretty(records) {
        Ok(json) => info!("Seller data ({} records):\n{}", records.len(), json),
        Err(e) => warn!("Failed to serialize seller data: {}", e),
    }
}
