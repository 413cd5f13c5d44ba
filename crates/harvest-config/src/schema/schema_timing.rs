//! Timing and retry budgets of the seller iteration engine.
//!
//! All timing values are milliseconds.

use serde::{Deserialize, Serialize};

/// Poll timeouts and settle delays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Sampling interval of every "wait until visible" check.
    pub poll_interval: u64,

    pub modal_timeout: u64,
    pub panel_timeout: u64,
    /// Wait for the listing after applying a seller filter.
    pub listing_timeout: u64,
    /// Wait for the listing when re-verifying between sellers.
    pub recheck_listing_timeout: u64,
    pub tab_ready_timeout: u64,
    pub contact_tab_timeout: u64,

    pub after_filters_click: u64,
    pub after_group_click: u64,
    pub after_uncheck: u64,
    pub after_facet_click: u64,
    pub after_first_apply: u64,
    pub after_second_apply: u64,
    pub after_tab_open: u64,
    pub after_link_click: u64,
    pub after_contact_click: u64,
    pub after_context_close: u64,
    pub between_sellers: u64,

    pub contact_retry_delay: u64,
    pub seller_link_retry_delay: u64,
    pub panel_retry_delay: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval: 200,
            modal_timeout: 5_000,
            panel_timeout: 5_000,
            listing_timeout: 8_000,
            recheck_listing_timeout: 5_000,
            tab_ready_timeout: 10_000,
            contact_tab_timeout: 5_000,
            after_filters_click: 800,
            after_group_click: 1_200,
            after_uncheck: 400,
            after_facet_click: 600,
            after_first_apply: 1_200,
            after_second_apply: 2_000,
            after_tab_open: 4_000,
            after_link_click: 3_000,
            after_contact_click: 1_500,
            after_context_close: 500,
            between_sellers: 1_000,
            contact_retry_delay: 8_000,
            seller_link_retry_delay: 1_000,
            panel_retry_delay: 1_000,
        }
    }
}

/// Bounded retry budgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts to bring the filter modal and seller panel into the open state.
    pub panel_max_retries: u32,
    /// Attempts to find the "sold & shipped by" link.
    pub seller_link_attempts: u32,
    /// Rounds of contact-tab polling before accepting a partial parse.
    pub contact_rounds: u32,
    /// Extra reopen-and-extract attempts for the same product.
    pub extraction_reopens: u32,
    /// Listing-page recovery steps (history back, then reload).
    pub recovery_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            panel_max_retries: 5,
            seller_link_attempts: 5,
            contact_rounds: 3,
            extraction_reopens: 1,
            recovery_attempts: 2,
        }
    }
}
