//! Seller-page navigation and contact extraction inside an auxiliary context.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use harvest_protocols::{AuxiliaryContext, ExtractionOutcome, NOT_FOUND, SellerRecord, Sentinel};

use crate::options::EngineOptions;
use crate::oracle::PollingOracle;
use crate::parser::{ContactDetails, parse_contact};

/// Follows the "sold & shipped by" link of a product page and reads the
/// seller's contact tab.
///
/// Stateless between calls; never closes the context it is given.
#[derive(Clone)]
pub struct ContextExtractor {
    options: Arc<EngineOptions>,
    oracle: PollingOracle,
}

impl ContextExtractor {
    pub fn new(options: Arc<EngineOptions>) -> Self {
        let oracle = PollingOracle::new(options.poll_interval());
        Self { options, oracle }
    }

    /// Extract one seller's contact data.
    ///
    /// `display_index` is the 1-based record id.
    pub async fn extract(
        &self,
        context: &dyn AuxiliaryContext,
        seller_id: &str,
        display_index: usize,
    ) -> ExtractionOutcome {
        if !self.follow_seller_link(context, seller_id).await {
            warn!(seller = %seller_id, "Seller link not found");
            return ExtractionOutcome::retry(SellerRecord::unreachable(
                display_index,
                seller_id,
                Sentinel::SellerLinkNotFound,
            ));
        }

        sleep(EngineOptions::ms(self.options.timing.after_link_click)).await;

        let store_link = match context.current_url().await {
            Ok(url) if !url.is_empty() => url,
            Ok(_) => NOT_FOUND.to_string(),
            Err(e) => {
                debug!("Could not read seller page URL: {}", e);
                NOT_FOUND.to_string()
            }
        };
        debug!(seller = %seller_id, store_link = %store_link, "On seller page");

        self.read_contact(context, seller_id, display_index, &store_link)
            .await
    }

    /// Try every link strategy, retrying for late-rendering content.
    async fn follow_seller_link(&self, context: &dyn AuxiliaryContext, seller_id: &str) -> bool {
        let attempts = self.options.retry.seller_link_attempts;
        let strategies = self.options.link_strategies();

        for attempt in 1..=attempts {
            for (text, tags) in &strategies {
                match context.click_text_match(text, tags).await {
                    Ok(true) => {
                        debug!(seller = %seller_id, attempt, text = %text, tags = %tags, "Clicked seller link");
                        return true;
                    }
                    Ok(false) => {}
                    Err(e) => debug!("Seller link probe failed: {}", e),
                }
            }

            if attempt < attempts {
                debug!(seller = %seller_id, attempt, attempts, "Seller link not rendered yet");
                sleep(EngineOptions::ms(self.options.timing.seller_link_retry_delay)).await;
            }
        }

        false
    }

    async fn read_contact(
        &self,
        context: &dyn AuxiliaryContext,
        seller_id: &str,
        display_index: usize,
        store_link: &str,
    ) -> ExtractionOutcome {
        let timing = &self.options.timing;
        let rounds = self.options.retry.contact_rounds;
        let mut best: Option<ContactDetails> = None;
        let mut saw_tab = false;

        for round in 1..=rounds {
            if self
                .oracle
                .contact_tab(context, EngineOptions::ms(timing.contact_tab_timeout))
                .await
            {
                saw_tab = true;
                if let Err(e) = context.click_contact_tab().await {
                    debug!("Contact tab click failed: {}", e);
                }
                sleep(EngineOptions::ms(timing.after_contact_click)).await;

                match context.contact_text().await {
                    Ok(Some(text)) => {
                        let details = parse_contact(&text);
                        if details.has_valid_email() {
                            info!(seller = %seller_id, email = %details.email, "Contact found");
                            return ExtractionOutcome::accepted(details.into_record(
                                display_index,
                                seller_id,
                                store_link,
                            ));
                        }
                        if best
                            .as_ref()
                            .is_none_or(|b| details.completeness() > b.completeness())
                        {
                            best = Some(details);
                        }
                    }
                    Ok(None) => debug!(seller = %seller_id, round, "Contact region empty"),
                    Err(e) => debug!("Contact text unreadable: {}", e),
                }
            } else {
                debug!(seller = %seller_id, round, "Contact tab not visible");
            }

            if round < rounds {
                debug!(seller = %seller_id, round, rounds, "No email yet, waiting before next round");
                sleep(EngineOptions::ms(timing.contact_retry_delay)).await;
            }
        }

        let record = match best {
            Some(details) => details.into_record(display_index, seller_id, store_link),
            None => {
                let sentinel = if saw_tab {
                    Sentinel::NoContactContent
                } else {
                    Sentinel::NoContactTab
                };
                SellerRecord::failed(display_index, seller_id, sentinel).with_store_link(store_link)
            }
        };
        warn!(seller = %seller_id, email = %record.email, "Contact incomplete after {} rounds", rounds);
        ExtractionOutcome::retry(record)
    }
}
