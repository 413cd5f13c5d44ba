//! Polling oracle: bounded "wait until" over probe predicates.
//!
//! A timeout is a normal negative answer, never an error. A probe error
//! during a sample counts as "not yet".

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use harvest_protocols::{AuxiliaryContext, ProbeError, UiProbe};

#[derive(Debug, Clone, Copy)]
pub struct PollingOracle {
    interval: Duration,
}

impl PollingOracle {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sample `predicate` every interval until it is true or `timeout` elapses.
    ///
    /// Always samples at least once.
    pub async fn wait_for<F, Fut>(&self, label: &str, timeout: Duration, mut predicate: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, ProbeError>>,
    {
        let start = Instant::now();

        loop {
            match predicate().await {
                Ok(true) => {
                    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "{} confirmed", label);
                    return true;
                }
                Ok(false) => {}
                Err(e) => trace!("{} probe failed: {}", label, e),
            }

            if start.elapsed() >= timeout {
                debug!(timeout_ms = timeout.as_millis() as u64, "{} not detected", label);
                return false;
            }

            sleep(self.interval).await;
        }
    }

    pub async fn modal_open(&self, probe: &dyn UiProbe, timeout: Duration) -> bool {
        self.wait_for("filter modal", timeout, || probe.is_modal_open())
            .await
    }

    /// More than one facet control: the out-of-stock toggle alone does not count.
    pub async fn seller_panel_open(&self, probe: &dyn UiProbe, timeout: Duration) -> bool {
        self.wait_for("seller panel", timeout, || async move {
            Ok(probe.facet_control_count().await? > 1)
        })
        .await
    }

    pub async fn listing_page(&self, probe: &dyn UiProbe, timeout: Duration) -> bool {
        self.wait_for("product listing", timeout, || probe.is_listing_page())
            .await
    }

    pub async fn context_ready(&self, context: &dyn AuxiliaryContext, timeout: Duration) -> bool {
        self.wait_for("auxiliary context", timeout, || context.is_ready())
            .await
    }

    pub async fn contact_tab(&self, context: &dyn AuxiliaryContext, timeout: Duration) -> bool {
        self.wait_for("contact tab", timeout, || context.has_contact_tab())
            .await
    }
}
