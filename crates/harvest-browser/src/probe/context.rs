//! Auxiliary browsing context: a separate tab for one product.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;

use harvest_config::SelectorConfig;
use harvest_protocols::{AuxiliaryContext, ProbeError};

use super::scripts;
use crate::cdp::{CdpClient, PageSession};

/// [`AuxiliaryContext`] over a freshly created CDP target.
pub struct CdpAuxContext {
    client: Arc<CdpClient>,
    page: PageSession,
    selectors: Arc<SelectorConfig>,
    closed: AtomicBool,
}

impl CdpAuxContext {
    pub(crate) fn new(client: Arc<CdpClient>, page: PageSession, selectors: Arc<SelectorConfig>) -> Self {
        Self {
            client,
            page,
            selectors,
            closed: AtomicBool::new(false),
        }
    }

    async fn eval_bool(&self, expression: &str) -> Result<bool, ProbeError> {
        Ok(self.page.evaluate(expression).await?.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl AuxiliaryContext for CdpAuxContext {
    async fn is_ready(&self) -> Result<bool, ProbeError> {
        self.eval_bool(scripts::document_complete()).await
    }

    async fn click_text_match(&self, text: &str, tags: &str) -> Result<bool, ProbeError> {
        self.eval_bool(&scripts::click_text_match(text, tags)).await
    }

    async fn current_url(&self) -> Result<String, ProbeError> {
        Ok(self.page.get_url().await?)
    }

    async fn has_contact_tab(&self) -> Result<bool, ProbeError> {
        self.eval_bool(&scripts::exists(&self.selectors.contact_tab)).await
    }

    async fn click_contact_tab(&self) -> Result<bool, ProbeError> {
        self.eval_bool(&scripts::click(&self.selectors.contact_tab)).await
    }

    async fn contact_text(&self) -> Result<Option<String>, ProbeError> {
        let value = self
            .page
            .evaluate(&scripts::raw_text_of(&self.selectors.contact_content))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn close(&self) -> Result<(), ProbeError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.close_page(&self.page).await?;
        debug!("Closed auxiliary context {}", self.page.target_id());
        Ok(())
    }
}
