//! One seller: filter, open the product, extract, close.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use harvest_protocols::{AuxiliaryContext, SellerFacet, SellerRecord, Sentinel};

use crate::engine::SellerEngine;
use crate::error::EngineError;
use crate::options::EngineOptions;

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl SellerEngine {
    /// Process one seller; errors and panics become an "unexpected error" record.
    pub(crate) async fn process_guarded(
        &self,
        facet: &SellerFacet,
        display_index: usize,
        cancel: &CancellationToken,
    ) -> SellerRecord {
        let result = AssertUnwindSafe(self.process_seller(facet, display_index, cancel))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload.as_ref()))));

        result.unwrap_or_else(|e| {
            error!(seller = %facet.id, "Unexpected error while processing seller: {}", e);
            SellerRecord::unreachable(display_index, &facet.id, Sentinel::UnexpectedError)
        })
    }

    async fn process_seller(
        &self,
        facet: &SellerFacet,
        display_index: usize,
        cancel: &CancellationToken,
    ) -> Result<SellerRecord, EngineError> {
        let timing = &self.options.timing;

        self.deselect_others().await?;

        if !self.probe.click_facet(&facet.id).await? {
            warn!(seller = %facet.id, "Seller checkbox missing");
            return Ok(SellerRecord::unreachable(
                display_index,
                &facet.id,
                Sentinel::CheckboxMissing,
            ));
        }
        sleep(EngineOptions::ms(timing.after_facet_click)).await;

        // The filter only sticks after the apply action fires twice.
        if !self.probe.apply_filters().await? {
            debug!("Apply action not found on first click");
        }
        sleep(EngineOptions::ms(timing.after_first_apply)).await;
        if !self.probe.apply_filters().await? {
            debug!("Apply action not found on second click");
        }
        sleep(EngineOptions::ms(timing.after_second_apply)).await;

        if !self
            .oracle
            .listing_page(self.probe.as_ref(), EngineOptions::ms(timing.listing_timeout))
            .await
        {
            warn!(seller = %facet.id, "Listing page did not load");
            return Ok(SellerRecord::unreachable(
                display_index,
                &facet.id,
                Sentinel::NavigationFailed,
            ));
        }

        let Some(product_url) = self.probe.first_product_link().await? else {
            warn!(seller = %facet.id, "No product on listing");
            self.panel.open(cancel).await;
            return Ok(SellerRecord::unreachable(display_index, &facet.id, Sentinel::NotFound));
        };
        debug!(seller = %facet.id, url = %product_url, "Representative product");

        Ok(self
            .extract_from_product(&product_url, &facet.id, display_index)
            .await)
    }

    /// Uncheck every checked facet except the out-of-stock toggle, the
    /// previously processed seller first.
    async fn deselect_others(&self) -> Result<(), EngineError> {
        let marker = &self.options.out_of_stock_marker;
        let mut checked = self.probe.checked_facets().await?;

        if let Some(previous) = self.store.previous_seller().await {
            if let Some(pos) = checked.iter().position(|id| *id == previous) {
                let id = checked.remove(pos);
                checked.insert(0, id);
            }
        }

        for id in checked
            .iter()
            .filter(|id| !SellerFacet::is_out_of_stock(id, marker))
        {
            debug!(facet = %id, "Unchecking facet");
            if !self.probe.click_facet(id).await? {
                debug!(facet = %id, "Checked facet vanished before uncheck");
            }
            sleep(EngineOptions::ms(self.options.timing.after_uncheck)).await;
        }

        Ok(())
    }

    /// Open the product in a fresh context, extract, and reopen when the
    /// extractor asks for it and the budget allows.
    ///
    /// Every opened context is closed before this returns.
    async fn extract_from_product(
        &self,
        url: &str,
        seller_id: &str,
        display_index: usize,
    ) -> SellerRecord {
        let timing = &self.options.timing;
        let attempts = 1 + self.options.retry.extraction_reopens;
        let mut previous: Option<SellerRecord> = None;

        for attempt in 1..=attempts {
            let context = match self.probe.open_context(url).await {
                Ok(context) => context,
                Err(e) => {
                    warn!(seller = %seller_id, "Could not open product context: {}", e);
                    return previous.unwrap_or_else(|| {
                        SellerRecord::unreachable(display_index, seller_id, Sentinel::PopupBlocked)
                    });
                }
            };
            sleep(EngineOptions::ms(timing.after_tab_open)).await;

            let ready = self
                .oracle
                .context_ready(context.as_ref(), EngineOptions::ms(timing.tab_ready_timeout))
                .await;
            let outcome = if ready {
                Some(
                    AssertUnwindSafe(self.extractor.extract(
                        context.as_ref(),
                        seller_id,
                        display_index,
                    ))
                    .catch_unwind()
                    .await,
                )
            } else {
                None
            };

            self.close_context(context.as_ref()).await;

            let outcome = match outcome {
                None => {
                    warn!(seller = %seller_id, "Product context did not finish loading");
                    return previous.unwrap_or_else(|| {
                        SellerRecord::unreachable(display_index, seller_id, Sentinel::TabLoadTimeout)
                    });
                }
                Some(Err(payload)) => {
                    error!(seller = %seller_id, "Extraction panicked: {}", panic_message(payload.as_ref()));
                    return previous.unwrap_or_else(|| {
                        SellerRecord::unreachable(display_index, seller_id, Sentinel::UnexpectedError)
                    });
                }
                Some(Ok(outcome)) => outcome,
            };

            let record = match previous.take() {
                Some(earlier) if earlier.completeness() > outcome.seller_data.completeness() => earlier,
                _ => outcome.seller_data,
            };

            if outcome.retry_requested && attempt < attempts {
                info!(seller = %seller_id, attempt, "Extraction incomplete, reopening product");
                previous = Some(record);
                continue;
            }
            return record;
        }

        previous.unwrap_or_else(|| {
            SellerRecord::unreachable(display_index, seller_id, Sentinel::UnexpectedError)
        })
    }

    async fn close_context(&self, context: &dyn AuxiliaryContext) {
        if let Err(e) = context.close().await {
            warn!("Failed to close product context: {}", e);
        }
        sleep(EngineOptions::ms(self.options.timing.after_context_close)).await;
    }
}
