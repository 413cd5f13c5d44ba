//! Probe bound to the listing tab.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use harvest_config::SelectorConfig;
use harvest_protocols::{AuxiliaryContext, BreadcrumbStep, FacetControl, ProbeError, UiProbe};

use super::context::CdpAuxContext;
use super::scripts;
use crate::cdp::{CdpClient, PageSession};

/// [`UiProbe`] over a CDP page session.
pub struct CdpUiProbe {
    client: Arc<CdpClient>,
    page: Arc<PageSession>,
    selectors: Arc<SelectorConfig>,
}

impl CdpUiProbe {
    pub fn new(client: Arc<CdpClient>, page: PageSession, selectors: SelectorConfig) -> Self {
        Self {
            client,
            page: Arc::new(page),
            selectors: Arc::new(selectors),
        }
    }

    async fn eval(&self, expression: &str) -> Result<Value, ProbeError> {
        Ok(self.page.evaluate(expression).await?)
    }

    async fn eval_bool(&self, expression: &str) -> Result<bool, ProbeError> {
        Ok(self.eval(expression).await?.as_bool().unwrap_or(false))
    }

    async fn click(&self, selector: &str, what: &str) -> Result<bool, ProbeError> {
        let clicked = self.eval_bool(&scripts::click(selector)).await?;
        if clicked {
            debug!("Clicked {}", what);
        } else {
            warn!("Element not found: {} ({})", what, selector);
        }
        Ok(clicked)
    }
}

#[async_trait]
impl UiProbe for CdpUiProbe {
    async fn is_modal_open(&self) -> Result<bool, ProbeError> {
        self.eval_bool(&scripts::exists(&self.selectors.modal)).await
    }

    async fn facet_control_count(&self) -> Result<usize, ProbeError> {
        let value = self.eval(&scripts::count(&self.selectors.facet_checkbox)).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn is_listing_page(&self) -> Result<bool, ProbeError> {
        let value = self.eval(&scripts::count(&self.selectors.product_card)).await?;
        Ok(value.as_u64().unwrap_or(0) > 0)
    }

    async fn open_filters(&self) -> Result<bool, ProbeError> {
        self.click(&self.selectors.filters_menu, "filters menu").await
    }

    async fn open_seller_group(&self) -> Result<bool, ProbeError> {
        self.click(&self.selectors.seller_group, "seller facet group").await
    }

    async fn close_modal(&self) -> Result<bool, ProbeError> {
        self.click(&self.selectors.modal_close, "modal close").await
    }

    async fn facet_controls(&self) -> Result<Vec<FacetControl>, ProbeError> {
        let s = &self.selectors;
        let script = scripts::facet_controls(&s.facet_checkbox, &s.facet_id_attribute, &s.facet_id_prefix);
        Ok(self.page.evaluate_as(&script).await?)
    }

    async fn checked_facets(&self) -> Result<Vec<String>, ProbeError> {
        let s = &self.selectors;
        let script = scripts::checked_facets(&s.facet_checkbox, &s.facet_id_attribute, &s.facet_id_prefix);
        Ok(self.page.evaluate_as(&script).await?)
    }

    async fn click_facet(&self, facet_id: &str) -> Result<bool, ProbeError> {
        let s = &self.selectors;
        let script = scripts::click_facet(
            &s.facet_checkbox,
            &s.facet_id_attribute,
            &s.facet_id_prefix,
            facet_id,
        );
        self.eval_bool(&script).await
    }

    async fn apply_filters(&self) -> Result<bool, ProbeError> {
        self.click(&self.selectors.apply_button, "apply button").await
    }

    async fn first_product_link(&self) -> Result<Option<String>, ProbeError> {
        let value = self.eval(&scripts::first_href(&self.selectors.product_link)).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn open_context(&self, url: &str) -> Result<Box<dyn AuxiliaryContext>, ProbeError> {
        let session = self
            .client
            .new_page(Some(url))
            .await
            .map_err(|e| ProbeError::ContextUnavailable(e.to_string()))?;

        debug!("Opened auxiliary context {} for {}", session.target_id(), url);
        Ok(Box::new(CdpAuxContext::new(
            self.client.clone(),
            session,
            self.selectors.clone(),
        )))
    }

    async fn go_back(&self) -> Result<(), ProbeError> {
        Ok(self.page.go_back().await?)
    }

    async fn reload(&self) -> Result<(), ProbeError> {
        Ok(self.page.reload().await?)
    }

    async fn category_name(&self) -> Result<Option<String>, ProbeError> {
        let value = self.eval(&scripts::text_of(&self.selectors.category_name)).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn breadcrumbs(&self) -> Result<Vec<BreadcrumbStep>, ProbeError> {
        let script = scripts::breadcrumbs(&self.selectors.breadcrumb_link);
        Ok(self.page.evaluate_as(&script).await?)
    }
}
