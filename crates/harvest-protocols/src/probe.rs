//! UI-probe traits.
//!
//! The engine never touches a document directly. Everything it needs from the
//! live page is a yes/no question, a click, or a piece of extracted text,
//! answered by an implementation of these traits (CDP in production, scripted
//! fakes in tests).

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::types::{BreadcrumbStep, FacetControl};

/// Probe bound to the main listing document.
///
/// Click methods return `Ok(false)` when the target element is absent.
#[async_trait]
pub trait UiProbe: Send + Sync {
    /// Whether the filter modal is open.
    async fn is_modal_open(&self) -> Result<bool, ProbeError>;

    /// Number of facet checkboxes currently rendered (out-of-stock toggle included).
    async fn facet_control_count(&self) -> Result<usize, ProbeError>;

    /// Whether product cards are visible, i.e. we are on a listing page.
    async fn is_listing_page(&self) -> Result<bool, ProbeError>;

    /// Click the filter entry point.
    async fn open_filters(&self) -> Result<bool, ProbeError>;

    /// Click the "sold by" facet group inside the filter modal.
    async fn open_seller_group(&self) -> Result<bool, ProbeError>;

    /// Best-effort dismissal of the filter modal.
    async fn close_modal(&self) -> Result<bool, ProbeError>;

    /// All facet controls of the seller panel, in document order.
    async fn facet_controls(&self) -> Result<Vec<FacetControl>, ProbeError>;

    /// Ids of the facets whose checkbox is currently checked.
    async fn checked_facets(&self) -> Result<Vec<String>, ProbeError>;

    /// Re-resolve a facet's checkbox from the live document and click it.
    async fn click_facet(&self, facet_id: &str) -> Result<bool, ProbeError>;

    /// Click the apply action of the filter modal.
    async fn apply_filters(&self) -> Result<bool, ProbeError>;

    /// URL of the first product on the listing, if any.
    async fn first_product_link(&self) -> Result<Option<String>, ProbeError>;

    /// Open `url` in a fresh auxiliary context.
    ///
    /// Returns [`ProbeError::ContextUnavailable`] when the context cannot be created.
    async fn open_context(&self, url: &str) -> Result<Box<dyn AuxiliaryContext>, ProbeError>;

    /// Navigate the main document one history entry back.
    async fn go_back(&self) -> Result<(), ProbeError>;

    /// Reload the main document.
    async fn reload(&self) -> Result<(), ProbeError>;

    /// Category heading of the listing page.
    async fn category_name(&self) -> Result<Option<String>, ProbeError>;

    /// Breadcrumb trail of the listing page.
    async fn breadcrumbs(&self) -> Result<Vec<BreadcrumbStep>, ProbeError>;
}

/// A secondary browsing context opened for one product.
///
/// The engine always calls [`AuxiliaryContext::close`] before moving on.
#[async_trait]
pub trait AuxiliaryContext: Send + Sync {
    /// Whether the document finished loading.
    async fn is_ready(&self) -> Result<bool, ProbeError>;

    /// Click the first element matching `tags` whose text contains `text`
    /// (case-insensitive).
    async fn click_text_match(&self, text: &str, tags: &str) -> Result<bool, ProbeError>;

    /// Current URL of the context.
    async fn current_url(&self) -> Result<String, ProbeError>;

    /// Whether the seller page's contact tab is present.
    async fn has_contact_tab(&self) -> Result<bool, ProbeError>;

    /// Activate the contact tab.
    async fn click_contact_tab(&self) -> Result<bool, ProbeError>;

    /// Text content of the contact region, `None` when absent or empty.
    async fn contact_text(&self) -> Result<Option<String>, ProbeError>;

    /// Close the context.
    async fn close(&self) -> Result<(), ProbeError>;
}
