//! Opening the filter modal and the seller facet panel.

use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use harvest_protocols::UiProbe;

use crate::options::EngineOptions;
use crate::oracle::PollingOracle;

/// Brings the page into the "seller panel open" state.
#[derive(Clone)]
pub struct PanelOpener {
    probe: Arc<dyn UiProbe>,
    options: Arc<EngineOptions>,
    oracle: PollingOracle,
}

impl PanelOpener {
    pub fn new(probe: Arc<dyn UiProbe>, options: Arc<EngineOptions>) -> Self {
        let oracle = PollingOracle::new(options.poll_interval());
        Self {
            probe,
            options,
            oracle,
        }
    }

    /// Whether the modal is up with the seller facets rendered.
    async fn already_open(&self) -> bool {
        let modal = self.probe.is_modal_open().await.unwrap_or(false);
        modal
            && self
                .probe
                .facet_control_count()
                .await
                .is_ok_and(|count| count > 1)
    }

    /// Open the filter modal and the seller group, retrying up to
    /// `retry.panel_max_retries` times.
    ///
    /// Returns `false` after exhausting retries or when `cancel` fires.
    pub async fn open(&self, cancel: &CancellationToken) -> bool {
        let timing = &self.options.timing;
        let max_retries = self.options.retry.panel_max_retries;
        let retry_delay = EngineOptions::ms(timing.panel_retry_delay);
        let probe = self.probe.as_ref();

        for attempt in 1..=max_retries {
            if cancel.is_cancelled() {
                info!("Panel opening cancelled");
                return false;
            }

            if self.already_open().await {
                debug!("Seller panel already open");
                return true;
            }

            debug!(attempt, max_retries, "Opening filter modal");
            if let Err(e) = probe.open_filters().await {
                debug!("Filter entry point click failed: {}", e);
            }
            sleep(EngineOptions::ms(timing.after_filters_click)).await;

            if !self
                .oracle
                .modal_open(probe, EngineOptions::ms(timing.modal_timeout))
                .await
            {
                warn!(attempt, max_retries, "Filter modal not detected");
                sleep(retry_delay).await;
                continue;
            }

            if let Err(e) = probe.open_seller_group().await {
                debug!("Seller group click failed: {}", e);
            }
            sleep(EngineOptions::ms(timing.after_group_click)).await;

            if self
                .oracle
                .seller_panel_open(probe, EngineOptions::ms(timing.panel_timeout))
                .await
            {
                info!(attempt, "Seller panel open");
                return true;
            }

            warn!(attempt, max_retries, "Seller panel not detected, closing modal");
            if let Err(e) = probe.close_modal().await {
                debug!("Closing filter modal failed: {}", e);
            }
            sleep(retry_delay).await;
        }

        warn!(max_retries, "Could not open seller panel");
        false
    }
}
