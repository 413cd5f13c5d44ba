//! BrowserManager page lookup.

use tracing::debug;

use super::{BrowserError, BrowserManager};
use crate::cdp::{PageInfo, PageSession};

impl BrowserManager {
    /// Pick the listing tab among open pages.
    ///
    /// With an empty filter the first regular page wins.
    pub fn select_listing_page<'a>(pages: &'a [PageInfo], url_contains: &str) -> Option<&'a PageInfo> {
        pages
            .iter()
            .filter(|p| p.is_page())
            .find(|p| url_contains.is_empty() || p.url.contains(url_contains))
    }

    /// Attach to the tab showing the listing page.
    pub async fn attach_listing_page(&self) -> Result<PageSession, BrowserError> {
        let client = self.connect().await?;
        let pages = client.list_pages().await?;

        let filter = &self.config.listing_url_contains;
        let page = Self::select_listing_page(&pages, filter).ok_or_else(|| {
            BrowserError::ListingTabNotFound(if filter.is_empty() {
                "no open tab".to_string()
            } else {
                format!("no tab whose URL contains '{}'", filter)
            })
        })?;

        debug!("Attaching to listing tab {} - {}", page.id, page.url);
        Ok(client.attach_page(&page.id).await?)
    }
}
