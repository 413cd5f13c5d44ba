//! Getting back to a usable listing between sellers.

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::{RunSummary, SellerEngine};
use crate::options::EngineOptions;

impl SellerEngine {
    /// Re-verify the listing and reopen the seller panel for the next seller.
    ///
    /// Never fails: whatever cannot be restored is counted and the loop
    /// moves on.
    pub(crate) async fn prepare_next(&self, summary: &mut RunSummary, cancel: &CancellationToken) {
        let timing = &self.options.timing;
        sleep(EngineOptions::ms(timing.between_sellers)).await;

        if !self
            .oracle
            .listing_page(
                self.probe.as_ref(),
                EngineOptions::ms(timing.recheck_listing_timeout),
            )
            .await
        {
            warn!("Listing page lost, attempting recovery");
            if !self.recover_listing().await {
                summary.recovery_failures += 1;
                warn!("Listing recovery failed, continuing with next seller");
            }
        }

        if self.panel.open(cancel).await || cancel.is_cancelled() {
            return;
        }

        warn!("Seller panel did not reopen, reloading page");
        if let Err(e) = self.probe.reload().await {
            debug!("Reload failed: {}", e);
        }
        self.oracle
            .listing_page(self.probe.as_ref(), EngineOptions::ms(timing.listing_timeout))
            .await;

        if !self.panel.open(cancel).await && !cancel.is_cancelled() {
            summary.panel_failures += 1;
            warn!("Seller panel unavailable after reload, skipping ahead");
        }
    }

    /// History back first, then reload, until the listing is back.
    async fn recover_listing(&self) -> bool {
        let attempts = self.options.retry.recovery_attempts;
        let timeout = EngineOptions::ms(self.options.timing.recheck_listing_timeout);

        for attempt in 0..attempts {
            let result = if attempt == 0 {
                debug!("Recovering listing via history back");
                self.probe.go_back().await
            } else {
                debug!("Recovering listing via reload");
                self.probe.reload().await
            };
            if let Err(e) = result {
                debug!("Recovery step failed: {}", e);
            }

            if self.oracle.listing_page(self.probe.as_ref(), timeout).await {
                info!(attempt = attempt + 1, "Listing page recovered");
                return true;
            }
        }

        false
    }
}
